//! Tree builder producing the concrete syntax tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! Statements are dispatched through a lookup table keyed on the leading
//! keyword; expressions descend through table-driven precedence levels.
//!
//! Every token becomes a leaf, so the resulting tree reproduces the source
//! text exactly. A branch with a single child collapses into that child.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::ast::{Node, Symbol},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize,
        tokens::{Token, TokenKind},
    },
    Position, Span,
};

use super::{
    lookups::{create_token_lookups, StmtHandler, StmtLookup},
    stmt::parse_stmt,
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, always terminated by an end marker
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Lookup table for statement parsing handlers, keyed on keyword text
    stmt_lookup: StmtLookup,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EndMarker) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position(0, Rc::clone(&file)));
            tokens.push(Token {
                kind: TokenKind::EndMarker,
                value: String::new(),
                prefix: String::new(),
                span: Span {
                    start: end.clone(),
                    end,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Returns the kind of the token `offset` positions ahead.
    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[index].kind
    }

    /// Turns the current token into a leaf and advances past it.
    ///
    /// The end marker is never consumed past.
    pub fn advance(&mut self) -> Rc<Node> {
        let leaf = Node::leaf(self.current_token());
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        leaf
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Rc<Node>, Error> {
        if self.current_token_kind() != expected_kind {
            match error {
                Some(error) => Err(error),
                None => Err(self.unexpected()),
            }
        } else {
            Ok(self.advance())
        }
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Rc<Node>, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Expects a name token spelling `keyword`.
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<Rc<Node>, Error> {
        if self.at_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_detailed(&format!("expected `{}`", keyword)))
        }
    }

    /// Expects a name that is not a reserved word.
    pub fn expect_identifier(&mut self) -> Result<Rc<Node>, Error> {
        if self.current_token().is_identifier() {
            Ok(self.advance())
        } else {
            Err(self.unexpected_detailed("expected identifier"))
        }
    }

    pub fn at_keyword(&self, keyword: &str) -> bool {
        self.current_token().is_keyword(keyword)
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EndMarker
    }

    /// Returns a reference to the statement lookup table.
    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    /// Registers a statement handler for a leading keyword or symbol.
    pub fn stmt(&mut self, keyword: &'static str, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(keyword, stmt_fn);
    }

    /// Returns the source position of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    pub fn get_file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    pub fn unexpected(&self) -> Error {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: self.current_token().value.clone(),
            },
            self.get_position(),
        )
    }

    pub fn unexpected_detailed(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().value.clone(),
                message: String::from(message),
            },
            self.get_position(),
        )
    }
}

/// Parses a stream of tokens into a `file_input` tree.
///
/// The last child of the returned node is always the end marker leaf.
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> Result<Rc<Node>, Error> {
    let mut parser = Parser::new(tokens, file);
    create_token_lookups(&mut parser);

    let mut children = vec![];

    while parser.has_tokens() {
        if parser.current_token_kind() == TokenKind::Newline {
            children.push(parser.advance());
            continue;
        }

        children.push(parse_stmt(&mut parser)?);
    }

    children.push(parser.advance());

    Ok(Node::branch(Symbol::FileInput, children))
}

/// Tokenizes and parses `source` in one step.
pub fn parse_source(source: &str, file: Option<String>) -> Result<Rc<Node>, Error> {
    let file_name = Rc::new(file.clone().unwrap_or_else(|| String::from("<formula>")));
    let tokens = tokenize(source.to_string(), file)?;
    parse(tokens, file_name)
}
