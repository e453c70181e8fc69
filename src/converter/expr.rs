use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::ast::{Node, Symbol, SyntaxKind},
    entity::{
        entity::{Entity, EntityKind, KeyValue},
        scope::resolve,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    ENSURE_SHAPE,
};

use super::converter::Converter;

/// String delimiters, longest first.
const STRING_DELIMITERS: [&str; 4] = ["\"\"\"", "'''", "\"", "'"];

/// Converts an expression node into a value entity contained by `scope`.
pub fn convert_value(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    let Some(symbol) = node.symbol() else {
        return convert_leaf(converter, node, scope);
    };

    match symbol {
        Symbol::Power => convert_power(converter, node, scope),
        Symbol::Atom => convert_atom(converter, node, scope),
        Symbol::TestList | Symbol::TestListStarExpr | Symbol::TestListGexp | Symbol::ExprList => {
            let items = list_items(node)
                .map(|item| convert_value(converter, item, scope))
                .collect::<Result<Vec<_>, Error>>()?;
            Ok(Entity::new(EntityKind::Tuple { items }, Some(scope), Some(node)))
        }
        symbol if symbol.is_complex_expression() => convert_complex(node, symbol, scope),
        Symbol::LambDef => Err(Error::at_node(
            ErrorImpl::unsupported(symbol, "lambda expression"),
            node,
        )),
        _ => Err(Error::at_node(
            ErrorImpl::unsupported(symbol, "expression"),
            node,
        )),
    }
}

fn convert_leaf(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    match node.kind {
        SyntaxKind::Token(TokenKind::Name) => {
            let found = resolve(scope, &node.value, converter).map_err(|error| error.locate(node))?;
            found.ok_or_else(|| {
                Error::at_node(
                    ErrorImpl::UndefinedName {
                        name: node.value.clone(),
                    },
                    node,
                )
            })
        }
        SyntaxKind::Token(TokenKind::Number) if !is_decimal_number(&node.value) => Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "hexadecimal, octal and binary numbers"),
            node,
        )),
        SyntaxKind::Token(TokenKind::Number) => Ok(Entity::new(
            EntityKind::Number {
                value: node.value.clone(),
            },
            Some(scope),
            Some(node),
        )),
        SyntaxKind::Token(TokenKind::String) => Ok(Entity::new(
            EntityKind::String {
                value: string_value(node)?,
            },
            Some(scope),
            Some(node),
        )),
        _ => Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "expression"),
            node,
        )),
    }
}

/// power: NAME trailer* ['**' factor]
fn convert_power(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    ENSURE_SHAPE!(node.children.len() >= 2, node, "a value followed by trailers");

    if node.children.iter().any(|child| child.is_token(TokenKind::DoubleStar)) {
        debug!(construct = %Symbol::Power, text = %node.text(), "unimplemented expression");
        return Ok(Entity::new(
            EntityKind::Unimplemented {
                construct: Symbol::Power,
            },
            Some(scope),
            Some(node),
        ));
    }

    let header = &node.children[0];
    if !header.is_token(TokenKind::Name) {
        return Err(Error::at_node(
            ErrorImpl::unsupported(&header.kind, "trailers must follow a plain name"),
            header,
        ));
    }

    let mut subject = convert_leaf(converter, header, scope)?;
    for trailer in &node.children[1..] {
        subject = convert_trailer(converter, trailer, subject, node, scope)?;
    }

    Ok(subject)
}

/// trailer: '(' [arglist] ')' | '[' subscript ']' | '.' NAME
fn convert_trailer(
    converter: &Converter,
    trailer: &Rc<Node>,
    subject: Rc<Entity>,
    power: &Rc<Node>,
    scope: &Rc<Entity>,
) -> Result<Rc<Entity>, Error> {
    ENSURE_SHAPE!(trailer.is_symbol(Symbol::Trailer), trailer, "a trailer");
    let children = &trailer.children;
    ENSURE_SHAPE!(children.len() == 2 || children.len() == 3, trailer, "2 or 3 children");

    let kind = match children[0].kind {
        SyntaxKind::Token(TokenKind::Dot) => {
            ENSURE_SHAPE!(children[1].is_token(TokenKind::Name), trailer, "a name after `.`");
            EntityKind::Attribute {
                subject,
                name: children[1].value.clone(),
            }
        }
        SyntaxKind::Token(TokenKind::LPar) => {
            ENSURE_SHAPE!(
                children[children.len() - 1].is_token(TokenKind::RPar),
                trailer,
                "`)` closing the call"
            );
            let (positional, named) = match children.len() {
                3 => convert_arguments(converter, &children[1], scope)?,
                _ => (vec![], IndexMap::new()),
            };
            EntityKind::Call {
                subject,
                positional,
                named,
            }
        }
        SyntaxKind::Token(TokenKind::LSqb) => {
            ENSURE_SHAPE!(children.len() == 3, trailer, "a subscript between brackets");
            ENSURE_SHAPE!(children[2].is_token(TokenKind::RSqb), trailer, "`]` closing the subscript");
            EntityKind::Key {
                subject,
                key: convert_key(&children[1])?,
            }
        }
        _ => {
            return Err(Error::at_node(
                ErrorImpl::malformed(&trailer.kind, "`.`, `(` or `[`"),
                trailer,
            ))
        }
    };

    Ok(Entity::new(kind, Some(scope), Some(power)))
}

fn convert_key(node: &Rc<Node>) -> Result<KeyValue, Error> {
    if node.is_symbol(Symbol::Subscript) || node.is_token(TokenKind::Colon) {
        return Err(Error::at_node(ErrorImpl::unsupported(&node.kind, "slices"), node));
    }

    if node.is_symbol(Symbol::SubscriptList) {
        return Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "several subscripts"),
            node,
        ));
    }

    if node.is_token(TokenKind::Number) {
        return node.value.parse::<i64>().map(KeyValue::Integer).map_err(|_| {
            Error::at_node(
                ErrorImpl::unsupported(&node.kind, "only integer and string keys are supported"),
                node,
            )
        });
    }

    if node.is_token(TokenKind::String) {
        return Ok(KeyValue::String(string_value(node)?));
    }

    Err(Error::at_node(
        ErrorImpl::unsupported(&node.kind, "only integer and string keys are supported"),
        node,
    ))
}

/// Converts call arguments: positional values in order, then named ones.
pub fn convert_arguments(
    converter: &Converter,
    node: &Rc<Node>,
    scope: &Rc<Entity>,
) -> Result<(Vec<Rc<Entity>>, IndexMap<String, Rc<Entity>>), Error> {
    let mut positional = vec![];
    let mut named = IndexMap::new();

    for argument in list_items(node) {
        if argument.is_token(TokenKind::Star) || argument.is_token(TokenKind::DoubleStar) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&argument.kind, "star arguments"),
                node,
            ));
        }

        if argument.is_symbol(Symbol::Argument) {
            ENSURE_SHAPE!(argument.children.len() == 3, argument, "`name=value`");
            ENSURE_SHAPE!(argument.children[0].is_token(TokenKind::Name), argument, "an argument name");
            let name = argument.children[0].value.clone();
            let value = convert_value(converter, &argument.children[2], scope)?;
            if named.insert(name, value).is_some() {
                return Err(Error::at_node(
                    ErrorImpl::malformed(&argument.kind, "each keyword argument at most once"),
                    argument,
                ));
            }
            continue;
        }

        ENSURE_SHAPE!(named.is_empty(), node, "positional arguments before keyword arguments");
        positional.push(convert_value(converter, argument, scope)?);
    }

    Ok((positional, named))
}

/// atom: '(' [testlist_gexp] ')' | '[' [listmaker] ']' | '{' [dictorsetmaker] '}' | STRING+
fn convert_atom(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    let children = &node.children;

    if children.iter().all(|child| child.is_token(TokenKind::String)) {
        let value = children
            .iter()
            .map(|child| string_value(child))
            .collect::<Result<String, Error>>()?;
        return Ok(Entity::new(EntityKind::String { value }, Some(scope), Some(node)));
    }

    if children[0].is_token(TokenKind::LBrace) {
        return Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "dict or set display"),
            node,
        ));
    }

    if children[0].is_token(TokenKind::LSqb) {
        debug!(construct = %Symbol::Atom, text = %node.text(), "unimplemented expression");
        return Ok(Entity::new(
            EntityKind::Unimplemented {
                construct: Symbol::Atom,
            },
            Some(scope),
            Some(node),
        ));
    }

    ENSURE_SHAPE!(children[0].is_token(TokenKind::LPar), node, "parentheses, brackets or strings");
    ENSURE_SHAPE!(
        children[children.len() - 1].is_token(TokenKind::RPar),
        node,
        "`)` closing the parentheses"
    );

    match children.len() {
        2 => Ok(Entity::new(EntityKind::Tuple { items: vec![] }, Some(scope), Some(node))),
        3 => convert_value(converter, &children[1], scope),
        _ => Err(Error::at_node(
            ErrorImpl::malformed(&node.kind, "2 or 3 children"),
            node,
        )),
    }
}

/// Expression levels that are recognised, checked for shape and left unconverted.
fn convert_complex(node: &Rc<Node>, symbol: Symbol, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    let length = node.children.len();

    match symbol {
        Symbol::Test => {
            ENSURE_SHAPE!(length == 5, node, "`value if test else value`");
            ENSURE_SHAPE!(node.children[1].is_keyword("if"), node, "`if` in a conditional expression");
            ENSURE_SHAPE!(node.children[3].is_keyword("else"), node, "`else` in a conditional expression");
        }
        Symbol::NotTest | Symbol::Factor => {
            ENSURE_SHAPE!(length == 2, node, "an operator and an operand");
        }
        _ => {
            ENSURE_SHAPE!(length >= 3 && length % 2 == 1, node, "operands separated by operators");
        }
    }

    debug!(construct = %symbol, text = %node.text(), "unimplemented expression");
    Ok(Entity::new(
        EntityKind::Unimplemented { construct: symbol },
        Some(scope),
        Some(node),
    ))
}

fn is_decimal_number(value: &str) -> bool {
    let radix = value.get(..2).map(str::to_ascii_lowercase);
    !matches!(radix.as_deref(), Some("0x" | "0o" | "0b"))
}

/// A lone string literal or adjacent string literals.
pub fn is_docstring(node: &Node) -> bool {
    node.is_token(TokenKind::String)
        || (node.is_symbol(Symbol::Atom)
            && node.children.iter().all(|child| child.is_token(TokenKind::String)))
}

fn string_value(node: &Rc<Node>) -> Result<String, Error> {
    strip_string_literal(&node.value).ok_or_else(|| {
        Error::at_node(
            ErrorImpl::malformed(&node.kind, "a quoted string literal"),
            node,
        )
    })
}

/// Removes the prefix letters and one layer of delimiters of a string literal.
pub fn strip_string_literal(literal: &str) -> Option<String> {
    let prefix = literal
        .chars()
        .take(2)
        .take_while(|c| matches!(c, 'u' | 'U' | 'r' | 'R' | 'b' | 'B'))
        .count();
    let body = &literal[prefix..];

    STRING_DELIMITERS.iter().find_map(|delimiter| {
        if body.len() >= 2 * delimiter.len() && body.starts_with(delimiter) && body.ends_with(delimiter) {
            Some(body[delimiter.len()..body.len() - delimiter.len()].to_string())
        } else {
            None
        }
    })
}

/// Children of a comma separated list, or the node itself when it was collapsed.
pub fn list_items(node: &Rc<Node>) -> Box<dyn Iterator<Item = &Rc<Node>> + '_> {
    match node.symbol() {
        Some(Symbol::TestList | Symbol::TestListStarExpr | Symbol::TestListGexp | Symbol::ExprList | Symbol::ArgList) => {
            Box::new(node.children.iter().filter(|child| !child.is_token(TokenKind::Comma)))
        }
        _ => Box::new(std::iter::once(node)),
    }
}
