use std::{fmt::Display, rc::Rc};

use crate::{
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

/// Grammar symbols of the concrete syntax tree.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Symbol {
    FileInput,
    ClassDef,
    FuncDef,
    Parameters,
    TypedArgsList,
    Suite,
    SimpleStmt,
    ExprStmt,
    ReturnStmt,
    IfStmt,
    ForStmt,
    WhileStmt,
    DelStmt,
    GlobalStmt,
    AssertStmt,
    RaiseStmt,
    Decorated,
    Decorator,
    Decorators,
    DottedName,
    Power,
    Trailer,
    ArgList,
    Argument,
    TestListStarExpr,
    TestList,
    TestListGexp,
    ListMaker,
    ExprList,
    Atom,
    DictOrSetMaker,
    Subscript,
    SubscriptList,
    SliceOp,
    LambDef,
    VarArgsList,
    Test,
    OrTest,
    AndTest,
    NotTest,
    Comparison,
    CompOp,
    Expr,
    AndExpr,
    ArithExpr,
    Term,
    Factor,
}

impl Symbol {
    pub fn name(&self) -> &'static str {
        match self {
            Symbol::FileInput => "file_input",
            Symbol::ClassDef => "classdef",
            Symbol::FuncDef => "funcdef",
            Symbol::Parameters => "parameters",
            Symbol::TypedArgsList => "typedargslist",
            Symbol::Suite => "suite",
            Symbol::SimpleStmt => "simple_stmt",
            Symbol::ExprStmt => "expr_stmt",
            Symbol::ReturnStmt => "return_stmt",
            Symbol::IfStmt => "if_stmt",
            Symbol::ForStmt => "for_stmt",
            Symbol::WhileStmt => "while_stmt",
            Symbol::DelStmt => "del_stmt",
            Symbol::GlobalStmt => "global_stmt",
            Symbol::AssertStmt => "assert_stmt",
            Symbol::RaiseStmt => "raise_stmt",
            Symbol::Decorated => "decorated",
            Symbol::Decorator => "decorator",
            Symbol::Decorators => "decorators",
            Symbol::DottedName => "dotted_name",
            Symbol::Power => "power",
            Symbol::Trailer => "trailer",
            Symbol::ArgList => "arglist",
            Symbol::Argument => "argument",
            Symbol::TestListStarExpr => "testlist_star_expr",
            Symbol::TestList => "testlist",
            Symbol::TestListGexp => "testlist_gexp",
            Symbol::ListMaker => "listmaker",
            Symbol::ExprList => "exprlist",
            Symbol::Atom => "atom",
            Symbol::DictOrSetMaker => "dictorsetmaker",
            Symbol::Subscript => "subscript",
            Symbol::SubscriptList => "subscriptlist",
            Symbol::SliceOp => "sliceop",
            Symbol::LambDef => "lambdef",
            Symbol::VarArgsList => "varargslist",
            Symbol::Test => "test",
            Symbol::OrTest => "or_test",
            Symbol::AndTest => "and_test",
            Symbol::NotTest => "not_test",
            Symbol::Comparison => "comparison",
            Symbol::CompOp => "comp_op",
            Symbol::Expr => "expr",
            Symbol::AndExpr => "and_expr",
            Symbol::ArithExpr => "arith_expr",
            Symbol::Term => "term",
            Symbol::Factor => "factor",
        }
    }

    /// Expression levels whose conversion is recognised but not implemented.
    pub fn is_complex_expression(&self) -> bool {
        matches!(
            self,
            Symbol::Test
                | Symbol::OrTest
                | Symbol::AndTest
                | Symbol::NotTest
                | Symbol::Comparison
                | Symbol::Expr
                | Symbol::AndExpr
                | Symbol::ArithExpr
                | Symbol::Term
                | Symbol::Factor
        )
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Node kind: a token for leaves, a grammar symbol for branches.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SyntaxKind {
    Token(TokenKind),
    Symbol(Symbol),
}

impl Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxKind::Token(kind) => write!(f, "{}", kind),
            SyntaxKind::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// A concrete syntax tree node.
///
/// Leaves carry their token text and the whitespace preceding it, branches carry
/// ordered children. Displaying a node writes its exact source text, prefix included.
#[derive(Debug)]
pub struct Node {
    pub kind: SyntaxKind,
    pub value: String,
    pub prefix: String,
    pub children: Vec<Rc<Node>>,
    pub span: Span,
}

impl Node {
    pub fn leaf(token: &Token) -> Rc<Node> {
        Rc::new(Node {
            kind: SyntaxKind::Token(token.kind),
            value: token.value.clone(),
            prefix: token.prefix.clone(),
            children: vec![],
            span: token.span.clone(),
        })
    }

    pub fn branch(symbol: Symbol, children: Vec<Rc<Node>>) -> Rc<Node> {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => Span {
                start: first.span.start.clone(),
                end: last.span.end.clone(),
            },
            _ => Span {
                start: Position::null(),
                end: Position::null(),
            },
        };
        let prefix = children.first().map(|child| child.prefix.clone()).unwrap_or_default();

        Rc::new(Node {
            kind: SyntaxKind::Symbol(symbol),
            value: String::new(),
            prefix,
            children,
            span,
        })
    }

    pub fn is_token(&self, kind: TokenKind) -> bool {
        self.kind == SyntaxKind::Token(kind)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == SyntaxKind::Symbol(symbol)
    }

    /// A name leaf spelling `keyword`.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is_token(TokenKind::Name) && self.value == keyword
    }

    /// A leaf whose token text is `value`.
    pub fn is_leaf_value(&self, value: &str) -> bool {
        self.children.is_empty() && matches!(self.kind, SyntaxKind::Token(_)) && self.value == value
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self.kind {
            SyntaxKind::Symbol(symbol) => Some(symbol),
            SyntaxKind::Token(_) => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<&Rc<Node>> {
        self.children.get(index)
    }

    /// Source text of the node without its leading prefix.
    pub fn text(&self) -> String {
        let full = self.to_string();
        full[self.prefix.len().min(full.len())..].to_string()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.children.is_empty() {
            if let SyntaxKind::Token(_) = self.kind {
                return write!(f, "{}{}", self.prefix, self.value);
            }
        }

        for child in &self.children {
            write!(f, "{}", child)?;
        }

        Ok(())
    }
}
