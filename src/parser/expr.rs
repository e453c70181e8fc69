use std::rc::Rc;

use crate::{
    ast::ast::{Node, Symbol},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    lookups::{BindingPower, BINARY_OPERATORS},
    parser::Parser,
};

/// Wraps `children` in a `symbol` branch unless there is only one.
pub fn collapse(symbol: Symbol, mut children: Vec<Rc<Node>>) -> Rc<Node> {
    if children.len() == 1 {
        children.remove(0)
    } else {
        Node::branch(symbol, children)
    }
}

/// Tokens that can never start an expression in a comma separated list.
pub fn at_expression_end(parser: &Parser) -> bool {
    matches!(
        parser.current_token_kind(),
        TokenKind::RPar
            | TokenKind::RSqb
            | TokenKind::RBrace
            | TokenKind::Newline
            | TokenKind::EndMarker
            | TokenKind::Indent
            | TokenKind::Dedent
            | TokenKind::Colon
            | TokenKind::Equal
            | TokenKind::PlusEqual
            | TokenKind::MinEqual
            | TokenKind::StarEqual
            | TokenKind::SlashEqual
    ) || parser.at_keyword("in")
}

/// Parses `item (',' item)* [',']`, collapsing a lone item without comma.
pub fn parse_comma_list(
    parser: &mut Parser,
    item: fn(&mut Parser) -> Result<Rc<Node>, Error>,
    symbol: Symbol,
) -> Result<Rc<Node>, Error> {
    let mut children = vec![item(parser)?];

    while parser.current_token_kind() == TokenKind::Comma {
        children.push(parser.advance());
        if at_expression_end(parser) {
            break;
        }
        children.push(item(parser)?);
    }

    Ok(collapse(symbol, children))
}

/// test: or_test ['if' or_test 'else' test] | lambdef
pub fn parse_test(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    if parser.at_keyword("lambda") {
        return parse_lambdef(parser);
    }

    let body = parse_expr(parser, BindingPower::Or)?;

    if !parser.at_keyword("if") {
        return Ok(body);
    }

    let if_keyword = parser.advance();
    let condition = parse_expr(parser, BindingPower::Or)?;
    let else_keyword = parser.expect_keyword("else")?;
    let orelse = parse_test(parser)?;

    Ok(Node::branch(
        Symbol::Test,
        vec![body, if_keyword, condition, else_keyword, orelse],
    ))
}

/// lambdef: 'lambda' [varargslist] ':' test
fn parse_lambdef(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![parser.expect_keyword("lambda")?];

    if parser.current_token_kind() != TokenKind::Colon {
        children.push(parse_parameter_list(parser, Symbol::VarArgsList)?);
    }
    children.push(parser.expect(TokenKind::Colon)?);
    children.push(parse_test(parser)?);

    Ok(Node::branch(Symbol::LambDef, children))
}

/// Parameter names with optional defaults and `*`/`**` markers, as in
/// `typedargslist` and `varargslist`.
pub fn parse_parameter_list(parser: &mut Parser, symbol: Symbol) -> Result<Rc<Node>, Error> {
    let mut children = vec![];

    loop {
        if matches!(
            parser.current_token_kind(),
            TokenKind::Star | TokenKind::DoubleStar
        ) {
            children.push(parser.advance());
            children.push(parser.expect_identifier()?);
        } else {
            children.push(parser.expect_identifier()?);
            if parser.current_token_kind() == TokenKind::Equal {
                children.push(parser.advance());
                children.push(parse_test(parser)?);
            }
        }

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        children.push(parser.advance());
        if at_expression_end(parser) {
            break;
        }
    }

    Ok(collapse(symbol, children))
}

/// Parses the precedence level `bp` and everything binding tighter.
pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Rc<Node>, Error> {
    match bp {
        BindingPower::Default => parse_test(parser),
        BindingPower::Not => parse_not_test(parser),
        BindingPower::Unary => parse_factor(parser),
        BindingPower::Power | BindingPower::Primary => parse_power(parser),
        _ => parse_binary_level(parser, bp),
    }
}

fn current_operator(parser: &Parser) -> Option<BindingPower> {
    let token = parser.current_token();
    match token.kind {
        TokenKind::String | TokenKind::Number => None,
        _ => BINARY_OPERATORS.get(token.value.as_str()).copied(),
    }
}

/// Flat n-ary node: operand (op operand)*
fn parse_binary_level(parser: &mut Parser, bp: BindingPower) -> Result<Rc<Node>, Error> {
    let mut children = vec![parse_expr(parser, bp.next())?];

    while current_operator(parser) == Some(bp) {
        if bp == BindingPower::Comparison {
            children.push(parse_comparison_operator(parser)?);
        } else {
            children.push(parser.advance());
        }
        children.push(parse_expr(parser, bp.next())?);
    }

    match bp.symbol() {
        Some(symbol) => Ok(collapse(symbol, children)),
        None => Err(parser.unexpected()),
    }
}

/// `not in` and `is not` become a comp_op node.
fn parse_comparison_operator(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    if parser.at_keyword("not") {
        let not_keyword = parser.advance();
        let in_keyword = parser.expect_keyword("in")?;
        return Ok(Node::branch(Symbol::CompOp, vec![not_keyword, in_keyword]));
    }

    if parser.at_keyword("is") {
        let is_keyword = parser.advance();
        if parser.at_keyword("not") {
            let not_keyword = parser.advance();
            return Ok(Node::branch(Symbol::CompOp, vec![is_keyword, not_keyword]));
        }
        return Ok(is_keyword);
    }

    Ok(parser.advance())
}

/// not_test: 'not' not_test | comparison
fn parse_not_test(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    if parser.at_keyword("not") {
        let not_keyword = parser.advance();
        let operand = parse_not_test(parser)?;
        return Ok(Node::branch(Symbol::NotTest, vec![not_keyword, operand]));
    }

    parse_expr(parser, BindingPower::Comparison)
}

/// factor: ('+'|'-'|'~') factor | power
pub fn parse_factor(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    match parser.current_token_kind() {
        TokenKind::Plus | TokenKind::Minus | TokenKind::Tilde => {
            let operator = parser.advance();
            let operand = parse_factor(parser)?;
            Ok(Node::branch(Symbol::Factor, vec![operator, operand]))
        }
        _ => parse_power(parser),
    }
}

/// power: atom trailer* ['**' factor]
pub fn parse_power(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![parse_atom(parser)?];

    while matches!(
        parser.current_token_kind(),
        TokenKind::LPar | TokenKind::LSqb | TokenKind::Dot
    ) {
        children.push(parse_trailer(parser)?);
    }

    if parser.current_token_kind() == TokenKind::DoubleStar {
        children.push(parser.advance());
        children.push(parse_factor(parser)?);
    }

    Ok(collapse(Symbol::Power, children))
}

/// trailer: '(' [arglist] ')' | '[' subscript ']' | '.' NAME
pub fn parse_trailer(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    match parser.current_token_kind() {
        TokenKind::LPar => {
            let lpar = parser.advance();
            if parser.current_token_kind() == TokenKind::RPar {
                let rpar = parser.advance();
                return Ok(Node::branch(Symbol::Trailer, vec![lpar, rpar]));
            }
            let arguments = parse_arglist(parser)?;
            let rpar = parser.expect(TokenKind::RPar)?;
            Ok(Node::branch(Symbol::Trailer, vec![lpar, arguments, rpar]))
        }
        TokenKind::LSqb => {
            let lsqb = parser.advance();
            let subscript = parse_subscriptlist(parser)?;
            let rsqb = parser.expect(TokenKind::RSqb)?;
            Ok(Node::branch(Symbol::Trailer, vec![lsqb, subscript, rsqb]))
        }
        TokenKind::Dot => {
            let dot = parser.advance();
            let name = parser.expect(TokenKind::Name)?;
            Ok(Node::branch(Symbol::Trailer, vec![dot, name]))
        }
        _ => Err(parser.unexpected()),
    }
}

fn at_subscript_end(parser: &Parser) -> bool {
    matches!(
        parser.current_token_kind(),
        TokenKind::RSqb | TokenKind::Comma | TokenKind::Colon
    )
}

/// subscriptlist: subscript (',' subscript)* [',']
fn parse_subscriptlist(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![parse_subscript(parser)?];

    while parser.current_token_kind() == TokenKind::Comma {
        children.push(parser.advance());
        if parser.current_token_kind() == TokenKind::RSqb {
            break;
        }
        children.push(parse_subscript(parser)?);
    }

    Ok(collapse(Symbol::SubscriptList, children))
}

/// subscript: test | [test] ':' [test] [sliceop]
fn parse_subscript(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![];

    if parser.current_token_kind() != TokenKind::Colon {
        let lower = parse_test(parser)?;
        if parser.current_token_kind() != TokenKind::Colon {
            return Ok(lower);
        }
        children.push(lower);
    }

    children.push(parser.advance());
    if !at_subscript_end(parser) {
        children.push(parse_test(parser)?);
    }

    // sliceop: ':' [test]
    if parser.current_token_kind() == TokenKind::Colon {
        let mut step = vec![parser.advance()];
        if !at_subscript_end(parser) {
            step.push(parse_test(parser)?);
        }
        children.push(collapse(Symbol::SliceOp, step));
    }

    Ok(collapse(Symbol::Subscript, children))
}

/// arglist: argument (',' argument)* [',']
///
/// `*args` and `**kwargs` markers stay as separate leaves before their value.
pub fn parse_arglist(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![];

    loop {
        if matches!(
            parser.current_token_kind(),
            TokenKind::Star | TokenKind::DoubleStar
        ) {
            children.push(parser.advance());
        }
        children.push(parse_argument(parser)?);

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        children.push(parser.advance());
        if parser.current_token_kind() == TokenKind::RPar {
            break;
        }
    }

    Ok(collapse(Symbol::ArgList, children))
}

/// argument: test | NAME '=' test
fn parse_argument(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    if parser.current_token().is_identifier() && parser.peek_kind(1) == TokenKind::Equal {
        let name = parser.advance();
        let equal = parser.advance();
        let value = parse_test(parser)?;
        return Ok(Node::branch(Symbol::Argument, vec![name, equal, value]));
    }

    parse_test(parser)
}

/// atom: '(' [testlist_gexp] ')' | '[' [listmaker] ']' | '{' [dictorsetmaker] '}' | NAME | NUMBER | STRING+
pub fn parse_atom(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    match parser.current_token_kind() {
        TokenKind::LPar => {
            let lpar = parser.advance();
            if parser.current_token_kind() == TokenKind::RPar {
                let rpar = parser.advance();
                return Ok(Node::branch(Symbol::Atom, vec![lpar, rpar]));
            }
            let inner = parse_comma_list(parser, parse_test, Symbol::TestListGexp)?;
            let rpar = parser.expect(TokenKind::RPar)?;
            Ok(Node::branch(Symbol::Atom, vec![lpar, inner, rpar]))
        }
        TokenKind::LSqb => {
            let lsqb = parser.advance();
            if parser.current_token_kind() == TokenKind::RSqb {
                let rsqb = parser.advance();
                return Ok(Node::branch(Symbol::Atom, vec![lsqb, rsqb]));
            }
            let inner = parse_comma_list(parser, parse_test, Symbol::ListMaker)?;
            let rsqb = parser.expect(TokenKind::RSqb)?;
            Ok(Node::branch(Symbol::Atom, vec![lsqb, inner, rsqb]))
        }
        TokenKind::LBrace => {
            let lbrace = parser.advance();
            if parser.current_token_kind() == TokenKind::RBrace {
                let rbrace = parser.advance();
                return Ok(Node::branch(Symbol::Atom, vec![lbrace, rbrace]));
            }
            let inner = parse_dictorsetmaker(parser)?;
            let rbrace = parser.expect(TokenKind::RBrace)?;
            Ok(Node::branch(Symbol::Atom, vec![lbrace, inner, rbrace]))
        }
        TokenKind::Name => {
            if !parser.current_token().is_identifier() {
                return Err(parser.unexpected_detailed("expected expression"));
            }
            Ok(parser.advance())
        }
        TokenKind::Number => Ok(parser.advance()),
        TokenKind::String => {
            let mut strings = vec![parser.advance()];
            while parser.current_token_kind() == TokenKind::String {
                strings.push(parser.advance());
            }
            Ok(collapse(Symbol::Atom, strings))
        }
        _ => Err(parser.unexpected()),
    }
}

/// dictorsetmaker: test ':' test (',' test ':' test)* [','] | test (',' test)* [',']
fn parse_dictorsetmaker(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    let mut children = vec![];

    loop {
        children.push(parse_test(parser)?);
        if parser.current_token_kind() == TokenKind::Colon {
            children.push(parser.advance());
            children.push(parse_test(parser)?);
        }

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        children.push(parser.advance());
        if parser.current_token_kind() == TokenKind::RBrace {
            break;
        }
    }

    Ok(collapse(Symbol::DictOrSetMaker, children))
}

/// testlist: test (',' test)* [',']
pub fn parse_testlist(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    parse_comma_list(parser, parse_test, Symbol::TestList)
}

/// testlist_star_expr: test (',' test)* [',']
pub fn parse_testlist_star_expr(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    parse_comma_list(parser, parse_test, Symbol::TestListStarExpr)
}

fn parse_bit_or(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    parse_expr(parser, BindingPower::BitOr)
}

/// exprlist: expr (',' expr)* [',']
pub fn parse_exprlist(parser: &mut Parser) -> Result<Rc<Node>, Error> {
    parse_comma_list(parser, parse_bit_or, Symbol::ExprList)
}
