//! Unit tests for the parser module.
//!
//! This module contains tests for building the concrete syntax tree:
//! - Class and function definitions
//! - Assignments, returns and expression statements
//! - Expression precedence levels and trailers
//! - Control flow and decorators
//! - Lossless source reproduction and syntax errors

use std::rc::Rc;

use crate::{
    ast::ast::{Node, Symbol},
    lexer::tokens::TokenKind,
};

use super::parser::parse_source;

fn parse_ok(source: &str) -> Rc<Node> {
    parse_source(source, Some("test.py".to_string())).unwrap()
}

/// First statement of the file, unwrapped from its simple_stmt.
fn first_small_stmt(source: &str) -> Rc<Node> {
    let tree = parse_ok(source);
    let stmt = Rc::clone(&tree.children[0]);
    assert!(stmt.is_symbol(Symbol::SimpleStmt));
    Rc::clone(&stmt.children[0])
}

#[test]
fn test_parse_file_input_shape() {
    let tree = parse_ok("x = 1\n");

    assert!(tree.is_symbol(Symbol::FileInput));
    assert_eq!(tree.children.len(), 2);
    assert!(tree.children[1].is_token(TokenKind::EndMarker));
}

#[test]
fn test_parse_reproduces_source() {
    let source = "class A(B):\n    # comment\n    def f(self, s, p):\n        x = p.start  # trailing\n\n        return x.offset('first-of', 'month')\n";
    let tree = parse_ok(source);

    assert_eq!(tree.to_string(), source);
}

#[test]
fn test_parse_class_definition() {
    let tree = parse_ok("class A(B):\n    def f(self):\n        return 1\n");
    let class = &tree.children[0];

    assert!(class.is_symbol(Symbol::ClassDef));
    assert_eq!(class.children.len(), 7);
    assert!(class.children[0].is_keyword("class"));
    assert_eq!(class.children[1].value, "A");
    assert_eq!(class.children[3].value, "B");
    assert!(class.children[6].is_symbol(Symbol::Suite));
}

#[test]
fn test_parse_class_with_several_bases() {
    let tree = parse_ok("class A(B, C):\n    pass\n");
    let class = &tree.children[0];

    assert!(class.children[3].is_symbol(Symbol::ArgList));
}

#[test]
fn test_parse_function_definition() {
    let tree = parse_ok("def f(self, simulation_context, period):\n    return period\n");
    let function = &tree.children[0];

    assert!(function.is_symbol(Symbol::FuncDef));
    assert_eq!(function.children.len(), 5);

    let parameters = &function.children[2];
    assert!(parameters.is_symbol(Symbol::Parameters));
    assert_eq!(parameters.children.len(), 3);
    assert!(parameters.children[1].is_symbol(Symbol::TypedArgsList));
    assert_eq!(parameters.children[1].children.len(), 5);

    let suite = &function.children[4];
    assert!(suite.children[0].is_token(TokenKind::Newline));
    assert!(suite.children[1].is_token(TokenKind::Indent));
    assert!(suite.children.last().unwrap().is_token(TokenKind::Dedent));
}

#[test]
fn test_parse_single_and_empty_parameters() {
    let tree = parse_ok("def f(a):\n    pass\ndef g():\n    pass\n");

    let single = &tree.children[0].children[2];
    assert!(single.children[1].is_token(TokenKind::Name));

    let empty = &tree.children[1].children[2];
    assert_eq!(empty.children.len(), 2);
}

#[test]
fn test_parse_default_parameters() {
    let tree = parse_ok("def f(a, b = 2, *rest):\n    pass\n");
    let arguments = &tree.children[0].children[2].children[1];

    let texts: Vec<String> = arguments.children.iter().map(|child| child.text()).collect();
    assert_eq!(texts, vec!["a", ",", "b", "=", "2", ",", "*", "rest"]);
}

#[test]
fn test_parse_assignment() {
    let stmt = first_small_stmt("x = y\n");

    assert!(stmt.is_symbol(Symbol::ExprStmt));
    assert_eq!(stmt.children.len(), 3);
    assert!(stmt.children[1].is_token(TokenKind::Equal));
}

#[test]
fn test_parse_augmented_assignment() {
    let stmt = first_small_stmt("x += 1\n");

    assert!(stmt.children[1].is_token(TokenKind::PlusEqual));
}

#[test]
fn test_parse_tuple_assignment() {
    let stmt = first_small_stmt("a, b = c, d\n");

    assert!(stmt.children[0].is_symbol(Symbol::TestListStarExpr));
    assert!(stmt.children[2].is_symbol(Symbol::TestListStarExpr));
    assert_eq!(stmt.children[0].children.len(), 3);
}

#[test]
fn test_parse_chained_assignment() {
    let stmt = first_small_stmt("a = b = 1\n");

    assert_eq!(stmt.children.len(), 5);
}

#[test]
fn test_parse_return() {
    let stmt = first_small_stmt("return period.start\n");

    assert!(stmt.is_symbol(Symbol::ReturnStmt));
    assert!(stmt.children[1].is_symbol(Symbol::Power));
}

#[test]
fn test_parse_bare_return() {
    let stmt = first_small_stmt("return\n");

    assert!(stmt.is_keyword("return"));
}

#[test]
fn test_parse_return_tuple() {
    let stmt = first_small_stmt("return a, b\n");

    assert!(stmt.children[1].is_symbol(Symbol::TestList));
}

#[test]
fn test_parse_power_trailers() {
    let stmt = first_small_stmt("simulation.calculate('x', period.offset(-1))[0]\n");

    assert!(stmt.is_symbol(Symbol::Power));
    assert_eq!(stmt.children.len(), 4);
    assert!(stmt.children[1].children[0].is_token(TokenKind::Dot));
    assert!(stmt.children[2].children[0].is_token(TokenKind::LPar));
    assert!(stmt.children[2].children[1].is_symbol(Symbol::ArgList));
    assert!(stmt.children[3].children[0].is_token(TokenKind::LSqb));
}

#[test]
fn test_parse_named_argument() {
    let stmt = first_small_stmt("f(a, b = 1)\n");
    let arguments = &stmt.children[1].children[1];

    assert!(arguments.children[2].is_symbol(Symbol::Argument));
}

#[test]
fn test_parse_single_argument_collapses() {
    let stmt = first_small_stmt("f(a)\n");

    assert!(stmt.children[1].children[1].is_token(TokenKind::Name));
}

#[test]
fn test_parse_precedence_levels() {
    let stmt = first_small_stmt("a + b * c\n");
    assert!(stmt.is_symbol(Symbol::ArithExpr));
    assert!(stmt.children[2].is_symbol(Symbol::Term));

    let stmt = first_small_stmt("a and b or c\n");
    assert!(stmt.is_symbol(Symbol::OrTest));
    assert!(stmt.children[0].is_symbol(Symbol::AndTest));

    let stmt = first_small_stmt("not a < b\n");
    assert!(stmt.is_symbol(Symbol::NotTest));
    assert!(stmt.children[1].is_symbol(Symbol::Comparison));

    let stmt = first_small_stmt("a & b | c\n");
    assert!(stmt.is_symbol(Symbol::Expr));
    assert!(stmt.children[0].is_symbol(Symbol::AndExpr));
}

#[test]
fn test_parse_flat_binary_level() {
    let stmt = first_small_stmt("a + b - c\n");

    assert!(stmt.is_symbol(Symbol::ArithExpr));
    assert_eq!(stmt.children.len(), 5);
}

#[test]
fn test_parse_unary_and_power() {
    let stmt = first_small_stmt("-a ** 2\n");

    assert!(stmt.is_symbol(Symbol::Factor));
    assert!(stmt.children[1].is_symbol(Symbol::Power));
}

#[test]
fn test_parse_not_in_comparison() {
    let stmt = first_small_stmt("a not in b\n");

    assert!(stmt.is_symbol(Symbol::Comparison));
    assert!(stmt.children[1].is_symbol(Symbol::CompOp));
}

#[test]
fn test_parse_conditional_expression() {
    let stmt = first_small_stmt("a if b else c\n");

    assert!(stmt.is_symbol(Symbol::Test));
    assert_eq!(stmt.children.len(), 5);
}

#[test]
fn test_parse_atoms() {
    let stmt = first_small_stmt("(a)\n");
    assert!(stmt.is_symbol(Symbol::Atom));
    assert_eq!(stmt.children.len(), 3);

    let stmt = first_small_stmt("()\n");
    assert_eq!(stmt.children.len(), 2);

    let stmt = first_small_stmt("[a, b]\n");
    assert!(stmt.children[1].is_symbol(Symbol::ListMaker));

    let stmt = first_small_stmt("(a, b)\n");
    assert!(stmt.children[1].is_symbol(Symbol::TestListGexp));

    let stmt = first_small_stmt("'a' 'b'\n");
    assert!(stmt.is_symbol(Symbol::Atom));
}

#[test]
fn test_parse_if_statement() {
    let tree = parse_ok("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
    let stmt = &tree.children[0];

    assert!(stmt.is_symbol(Symbol::IfStmt));
    assert_eq!(stmt.children.len(), 11);
    assert!(stmt.children[4].is_keyword("elif"));
    assert!(stmt.children[8].is_keyword("else"));
}

#[test]
fn test_parse_for_statement() {
    let tree = parse_ok("for a, b in items:\n    pass\n");
    let stmt = &tree.children[0];

    assert!(stmt.is_symbol(Symbol::ForStmt));
    assert!(stmt.children[1].is_symbol(Symbol::ExprList));
    assert!(stmt.children[2].is_keyword("in"));
}

#[test]
fn test_parse_while_statement() {
    let tree = parse_ok("while a:\n    pass\nelse:\n    pass\n");
    let stmt = &tree.children[0];

    assert!(stmt.is_symbol(Symbol::WhileStmt));
    assert_eq!(stmt.children.len(), 7);
    assert!(stmt.children[4].is_keyword("else"));
}

#[test]
fn test_parse_lambda() {
    let stmt = first_small_stmt("f(lambda x, y=1: x)\n");
    let lambda = &stmt.children[1].children[1];

    assert!(lambda.is_symbol(Symbol::LambDef));
    assert_eq!(lambda.children.len(), 4);
    assert!(lambda.children[1].is_symbol(Symbol::VarArgsList));
    assert_eq!(lambda.text(), "lambda x, y=1: x");

    let stmt = first_small_stmt("lambda: 1\n");
    assert!(stmt.is_symbol(Symbol::LambDef));
    assert_eq!(stmt.children.len(), 3);
}

#[test]
fn test_parse_dict_and_set_displays() {
    let stmt = first_small_stmt("{}\n");
    assert!(stmt.is_symbol(Symbol::Atom));
    assert!(stmt.children[0].is_token(TokenKind::LBrace));
    assert_eq!(stmt.children.len(), 2);

    let stmt = first_small_stmt("{a: 1,\n b: 2}\n");
    assert!(stmt.children[1].is_symbol(Symbol::DictOrSetMaker));
    assert_eq!(stmt.children[1].children.len(), 7);

    let stmt = first_small_stmt("{a, b}\n");
    assert_eq!(stmt.children[1].children.len(), 3);
}

#[test]
fn test_parse_subscripts() {
    let subscript = |source: &str| Rc::clone(&first_small_stmt(source).children[1].children[1]);

    let slice = subscript("a[1:2]\n");
    assert!(slice.is_symbol(Symbol::Subscript));
    assert_eq!(slice.children.len(), 3);

    let slice = subscript("a[::2]\n");
    assert!(slice.is_symbol(Symbol::Subscript));
    assert!(slice.children[1].is_symbol(Symbol::SliceOp));

    assert!(subscript("a[:]\n").is_token(TokenKind::Colon));
    assert!(subscript("a[1, :]\n").is_symbol(Symbol::SubscriptList));
    assert!(subscript("a[0]\n").is_token(TokenKind::Number));
}

#[test]
fn test_parse_keyword_statements() {
    let stmt = first_small_stmt("del a, b\n");
    assert!(stmt.is_symbol(Symbol::DelStmt));

    let stmt = first_small_stmt("global a, b\n");
    assert!(stmt.is_symbol(Symbol::GlobalStmt));
    assert_eq!(stmt.children.len(), 4);

    let stmt = first_small_stmt("assert a, 'message'\n");
    assert!(stmt.is_symbol(Symbol::AssertStmt));
    assert_eq!(stmt.children.len(), 4);

    let stmt = first_small_stmt("raise ValueError, 'message'\n");
    assert!(stmt.is_symbol(Symbol::RaiseStmt));

    assert!(first_small_stmt("raise\n").is_keyword("raise"));
}

#[test]
fn test_parse_inline_suite() {
    let tree = parse_ok("if a: x = 1\n");
    let stmt = &tree.children[0];

    assert!(stmt.children[3].is_symbol(Symbol::SimpleStmt));
}

#[test]
fn test_parse_decorated_function() {
    let tree = parse_ok("@dated_function(start = date(2010, 1, 1))\ndef f(self, s, p):\n    return p\n");
    let decorated = &tree.children[0];

    assert!(decorated.is_symbol(Symbol::Decorated));
    let decorator = &decorated.children[0];
    assert!(decorator.is_symbol(Symbol::Decorator));
    assert_eq!(decorator.children.len(), 6);
    assert!(decorator.children[3].is_symbol(Symbol::Argument));
    assert!(decorated.children[1].is_symbol(Symbol::FuncDef));
}

#[test]
fn test_parse_node_text_excludes_prefix() {
    let stmt = first_small_stmt("  \n# comment\nx = (a +\n     b)\n");

    assert_eq!(stmt.text(), "x = (a +\n     b)");
}

#[test]
fn test_parse_missing_colon() {
    let error = parse_source("def f(a)\n    pass\n", None).err().unwrap();

    assert_eq!(error.get_error_name(), "UnexpectedToken");
}

#[test]
fn test_parse_unsupported_statement() {
    let error = parse_source("import os\n", None).err().unwrap();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_unexpected_indent() {
    assert!(parse_source("    x = 1\n", None).is_err());
}
