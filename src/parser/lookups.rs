use std::{collections::HashMap, rc::Rc};

use lazy_static::lazy_static;

use crate::{
    ast::ast::{Node, Symbol},
    errors::errors::Error,
};

use super::{parser::Parser, stmt::*};

/// Precedence levels, loosest first.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub enum BindingPower {
    Default,
    Or,
    And,
    Not,
    Comparison,
    BitOr,
    BitAnd,
    Additive,
    Multiplicative,
    Unary,
    Power,
    Primary,
}

impl BindingPower {
    /// The next tighter level.
    pub fn next(&self) -> BindingPower {
        match self {
            BindingPower::Default => BindingPower::Or,
            BindingPower::Or => BindingPower::And,
            BindingPower::And => BindingPower::Not,
            BindingPower::Not => BindingPower::Comparison,
            BindingPower::Comparison => BindingPower::BitOr,
            BindingPower::BitOr => BindingPower::BitAnd,
            BindingPower::BitAnd => BindingPower::Additive,
            BindingPower::Additive => BindingPower::Multiplicative,
            BindingPower::Multiplicative => BindingPower::Unary,
            BindingPower::Unary => BindingPower::Power,
            BindingPower::Power | BindingPower::Primary => BindingPower::Primary,
        }
    }

    /// Grammar symbol of the n-ary node built at this level.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            BindingPower::Default => Some(Symbol::Test),
            BindingPower::Or => Some(Symbol::OrTest),
            BindingPower::And => Some(Symbol::AndTest),
            BindingPower::Not => Some(Symbol::NotTest),
            BindingPower::Comparison => Some(Symbol::Comparison),
            BindingPower::BitOr => Some(Symbol::Expr),
            BindingPower::BitAnd => Some(Symbol::AndExpr),
            BindingPower::Additive => Some(Symbol::ArithExpr),
            BindingPower::Multiplicative => Some(Symbol::Term),
            BindingPower::Unary => Some(Symbol::Factor),
            BindingPower::Power => Some(Symbol::Power),
            BindingPower::Primary => None,
        }
    }
}

lazy_static! {
    /// Binary operators keyed by token text.
    pub static ref BINARY_OPERATORS: HashMap<&'static str, BindingPower> = {
        let mut map = HashMap::new();
        map.insert("or", BindingPower::Or);
        map.insert("and", BindingPower::And);
        for op in ["<", ">", "==", "!=", "<=", ">=", "in", "not", "is"] {
            map.insert(op, BindingPower::Comparison);
        }
        map.insert("|", BindingPower::BitOr);
        map.insert("&", BindingPower::BitAnd);
        map.insert("+", BindingPower::Additive);
        map.insert("-", BindingPower::Additive);
        for op in ["*", "/", "//", "%"] {
            map.insert(op, BindingPower::Multiplicative);
        }
        map
    };
}

pub type StmtHandler = fn(&mut Parser) -> Result<Rc<Node>, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    parser.stmt("def", parse_funcdef);
    parser.stmt("class", parse_classdef);
    parser.stmt("if", parse_if_stmt);
    parser.stmt("for", parse_for_stmt);
    parser.stmt("while", parse_while_stmt);
    parser.stmt("@", parse_decorated);
}

// Lookup table inside parser struct, so it's easier
pub type StmtLookup = HashMap<&'static str, StmtHandler>;
