use std::rc::Rc;

use crate::{
    ast::ast::{Node, Symbol},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::{
        collapse, parse_arglist, parse_exprlist, parse_parameter_list, parse_test, parse_testlist,
        parse_testlist_star_expr,
    },
    parser::Parser,
};

/// Keywords that may start a simple statement.
const SIMPLE_STMT_KEYWORDS: [&str; 10] = [
    "return", "pass", "break", "continue", "not", "lambda", "del", "global", "assert", "raise",
];

pub fn parse_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let token = parser.current_token();
    let handler = match token.kind {
        TokenKind::Name | TokenKind::At => parser.get_stmt_lookup().get(token.value.as_str()).copied(),
        _ => None,
    };

    match handler {
        Some(handler) => handler(parser),
        None => parse_simple_stmt(parser),
    }
}

/// simple_stmt: small_stmt NEWLINE
pub fn parse_simple_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let small = parse_small_stmt(parser)?;
    let error = parser.unexpected_detailed("expected end of line");
    let newline = parser.expect_error(TokenKind::Newline, Some(error))?;

    Ok(Node::branch(Symbol::SimpleStmt, vec![small, newline]))
}

fn parse_small_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let token = parser.current_token();
    if !token.is_identifier()
        && token.kind == TokenKind::Name
        && !SIMPLE_STMT_KEYWORDS.contains(&token.value.as_str())
    {
        return Err(parser.unexpected_detailed("statement is not part of the formula grammar"));
    }

    if parser.at_keyword("return") {
        return parse_return_stmt(parser);
    }

    if parser.at_keyword("pass") || parser.at_keyword("break") || parser.at_keyword("continue") {
        return Ok(parser.advance());
    }

    if parser.at_keyword("del") {
        let keyword = parser.advance();
        let targets = parse_exprlist(parser)?;
        return Ok(Node::branch(Symbol::DelStmt, vec![keyword, targets]));
    }

    if parser.at_keyword("global") {
        return parse_global_stmt(parser);
    }

    if parser.at_keyword("assert") || parser.at_keyword("raise") {
        return parse_assert_or_raise_stmt(parser);
    }

    parse_expr_stmt(parser)
}

/// return_stmt: 'return' [testlist]
fn parse_return_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let keyword = parser.advance();

    if parser.current_token_kind() == TokenKind::Newline {
        return Ok(keyword);
    }

    let value = parse_testlist(parser)?;
    Ok(Node::branch(Symbol::ReturnStmt, vec![keyword, value]))
}

/// global_stmt: 'global' NAME (',' NAME)*
fn parse_global_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![parser.expect_keyword("global")?, parser.expect_identifier()?];

    while parser.current_token_kind() == TokenKind::Comma {
        children.push(parser.advance());
        children.push(parser.expect_identifier()?);
    }

    Ok(Node::branch(Symbol::GlobalStmt, children))
}

/// assert_stmt: 'assert' test [',' test]
/// raise_stmt: 'raise' [test [',' test [',' test]]]
fn parse_assert_or_raise_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let (symbol, limit) = if parser.at_keyword("assert") {
        (Symbol::AssertStmt, 2)
    } else {
        (Symbol::RaiseStmt, 3)
    };
    let mut children = vec![parser.advance()];

    if symbol == Symbol::AssertStmt || parser.current_token_kind() != TokenKind::Newline {
        children.push(parse_test(parser)?);
        let mut count = 1;
        while count < limit && parser.current_token_kind() == TokenKind::Comma {
            children.push(parser.advance());
            children.push(parse_test(parser)?);
            count += 1;
        }
    }

    Ok(collapse(symbol, children))
}

/// expr_stmt: testlist_star_expr (augassign testlist | ('=' testlist_star_expr)*)
fn parse_expr_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let first = parse_testlist_star_expr(parser)?;

    match parser.current_token_kind() {
        TokenKind::PlusEqual | TokenKind::MinEqual | TokenKind::StarEqual | TokenKind::SlashEqual => {
            let operator = parser.advance();
            let value = parse_testlist(parser)?;
            Ok(Node::branch(Symbol::ExprStmt, vec![first, operator, value]))
        }
        TokenKind::Equal => {
            let mut children = vec![first];
            while parser.current_token_kind() == TokenKind::Equal {
                children.push(parser.advance());
                children.push(parse_testlist_star_expr(parser)?);
            }
            Ok(Node::branch(Symbol::ExprStmt, children))
        }
        _ => Ok(first),
    }
}

/// suite: simple_stmt | NEWLINE INDENT stmt+ DEDENT
pub fn parse_suite(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    if parser.current_token_kind() != TokenKind::Newline {
        return parse_simple_stmt(parser);
    }

    let mut children = vec![parser.advance()];
    let error = parser.unexpected_detailed("expected an indented block");
    children.push(parser.expect_error(TokenKind::Indent, Some(error))?);

    while parser.current_token_kind() != TokenKind::Dedent {
        if !parser.has_tokens() {
            return Err(parser.unexpected_detailed("unexpected end of input in block"));
        }
        children.push(parse_stmt(parser)?);
    }

    children.push(parser.advance());

    Ok(Node::branch(Symbol::Suite, children))
}

/// funcdef: 'def' NAME parameters ':' suite
pub fn parse_funcdef(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let keyword = parser.expect_keyword("def")?;
    let name = parser.expect_identifier()?;
    let parameters = parse_parameters(parser)?;
    let colon = parser.expect(TokenKind::Colon)?;
    let suite = parse_suite(parser)?;

    Ok(Node::branch(
        Symbol::FuncDef,
        vec![keyword, name, parameters, colon, suite],
    ))
}

/// parameters: '(' [typedargslist] ')'
fn parse_parameters(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let lpar = parser.expect(TokenKind::LPar)?;

    if parser.current_token_kind() == TokenKind::RPar {
        let rpar = parser.advance();
        return Ok(Node::branch(Symbol::Parameters, vec![lpar, rpar]));
    }

    let arguments = parse_parameter_list(parser, Symbol::TypedArgsList)?;
    let rpar = parser.expect(TokenKind::RPar)?;

    Ok(Node::branch(Symbol::Parameters, vec![lpar, arguments, rpar]))
}

/// classdef: 'class' NAME ['(' [arglist] ')'] ':' suite
pub fn parse_classdef(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![parser.expect_keyword("class")?, parser.expect_identifier()?];

    if parser.current_token_kind() == TokenKind::LPar {
        children.push(parser.advance());
        if parser.current_token_kind() != TokenKind::RPar {
            children.push(parse_arglist(parser)?);
        }
        children.push(parser.expect(TokenKind::RPar)?);
    }

    children.push(parser.expect(TokenKind::Colon)?);
    children.push(parse_suite(parser)?);

    Ok(Node::branch(Symbol::ClassDef, children))
}

/// decorated: decorators (classdef | funcdef)
pub fn parse_decorated(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut decorators = vec![];
    while parser.current_token_kind() == TokenKind::At {
        decorators.push(parse_decorator(parser)?);
    }
    let decorators = collapse(Symbol::Decorators, decorators);

    let definition = if parser.at_keyword("def") {
        parse_funcdef(parser)?
    } else if parser.at_keyword("class") {
        parse_classdef(parser)?
    } else {
        return Err(parser.unexpected_detailed("expected a definition after decorator"));
    };

    Ok(Node::branch(Symbol::Decorated, vec![decorators, definition]))
}

/// decorator: '@' dotted_name ['(' [arglist] ')'] NEWLINE
fn parse_decorator(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![parser.expect(TokenKind::At)?];

    let mut name = vec![parser.expect_identifier()?];
    while parser.current_token_kind() == TokenKind::Dot {
        name.push(parser.advance());
        name.push(parser.expect(TokenKind::Name)?);
    }
    children.push(collapse(Symbol::DottedName, name));

    if parser.current_token_kind() == TokenKind::LPar {
        children.push(parser.advance());
        if parser.current_token_kind() != TokenKind::RPar {
            children.push(parse_arglist(parser)?);
        }
        children.push(parser.expect(TokenKind::RPar)?);
    }

    children.push(parser.expect(TokenKind::Newline)?);

    Ok(Node::branch(Symbol::Decorator, children))
}

/// if_stmt: 'if' test ':' suite ('elif' test ':' suite)* ['else' ':' suite]
pub fn parse_if_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![
        parser.expect_keyword("if")?,
        parse_test(parser)?,
        parser.expect(TokenKind::Colon)?,
        parse_suite(parser)?,
    ];

    while parser.at_keyword("elif") {
        children.push(parser.advance());
        children.push(parse_test(parser)?);
        children.push(parser.expect(TokenKind::Colon)?);
        children.push(parse_suite(parser)?);
    }

    if parser.at_keyword("else") {
        children.push(parser.advance());
        children.push(parser.expect(TokenKind::Colon)?);
        children.push(parse_suite(parser)?);
    }

    Ok(Node::branch(Symbol::IfStmt, children))
}

/// while_stmt: 'while' test ':' suite ['else' ':' suite]
pub fn parse_while_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![
        parser.expect_keyword("while")?,
        parse_test(parser)?,
        parser.expect(TokenKind::Colon)?,
        parse_suite(parser)?,
    ];

    if parser.at_keyword("else") {
        children.push(parser.advance());
        children.push(parser.expect(TokenKind::Colon)?);
        children.push(parse_suite(parser)?);
    }

    Ok(Node::branch(Symbol::WhileStmt, children))
}

/// for_stmt: 'for' exprlist 'in' testlist ':' suite ['else' ':' suite]
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![
        parser.expect_keyword("for")?,
        parse_exprlist(parser)?,
        parser.expect_keyword("in")?,
        parse_testlist(parser)?,
        parser.expect(TokenKind::Colon)?,
        parse_suite(parser)?,
    ];

    if parser.at_keyword("else") {
        children.push(parser.advance());
        children.push(parser.expect(TokenKind::Colon)?);
        children.push(parse_suite(parser)?);
    }

    Ok(Node::branch(Symbol::ForStmt, children))
}
