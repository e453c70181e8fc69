use lazy_static::lazy_static;
use std::{collections::HashSet, fmt::Display};

use crate::Span;

lazy_static! {
    /// Reserved words. They are lexed as names; the tree builder tells them apart by text.
    pub static ref KEYWORDS: HashSet<&'static str> = {
        let mut set = HashSet::new();
        set.insert("and");
        set.insert("as");
        set.insert("assert");
        set.insert("break");
        set.insert("class");
        set.insert("continue");
        set.insert("def");
        set.insert("del");
        set.insert("elif");
        set.insert("else");
        set.insert("except");
        set.insert("for");
        set.insert("from");
        set.insert("global");
        set.insert("if");
        set.insert("import");
        set.insert("in");
        set.insert("is");
        set.insert("lambda");
        set.insert("not");
        set.insert("or");
        set.insert("pass");
        set.insert("raise");
        set.insert("return");
        set.insert("try");
        set.insert("while");
        set.insert("with");
        set.insert("yield");
        set
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EndMarker,
    Name,
    Number,
    String,
    Newline,
    Indent,
    Dedent,

    LPar,
    RPar,
    LSqb,
    RSqb,
    LBrace,
    RBrace,

    Colon,
    Comma,
    Dot,
    At,

    Equal,      // =
    PlusEqual,  // +=
    MinEqual,   // -=
    StarEqual,  // *=
    SlashEqual, // /=

    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Tilde,

    Less,
    Greater,
    EqEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,

    Amper,
    VBar,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::EndMarker => "ENDMARKER",
            TokenKind::Name => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::LPar => "LPAR",
            TokenKind::RPar => "RPAR",
            TokenKind::LSqb => "LSQB",
            TokenKind::RSqb => "RSQB",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::At => "AT",
            TokenKind::Equal => "EQUAL",
            TokenKind::PlusEqual => "PLUSEQUAL",
            TokenKind::MinEqual => "MINEQUAL",
            TokenKind::StarEqual => "STAREQUAL",
            TokenKind::SlashEqual => "SLASHEQUAL",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::DoubleStar => "DOUBLESTAR",
            TokenKind::Slash => "SLASH",
            TokenKind::DoubleSlash => "DOUBLESLASH",
            TokenKind::Percent => "PERCENT",
            TokenKind::Tilde => "TILDE",
            TokenKind::Less => "LESS",
            TokenKind::Greater => "GREATER",
            TokenKind::EqEqual => "EQEQUAL",
            TokenKind::NotEqual => "NOTEQUAL",
            TokenKind::LessEqual => "LESSEQUAL",
            TokenKind::GreaterEqual => "GREATEREQUAL",
            TokenKind::Amper => "AMPER",
            TokenKind::VBar => "VBAR",
        }
    }

    pub fn is_opening_bracket(&self) -> bool {
        matches!(self, TokenKind::LPar | TokenKind::LSqb | TokenKind::LBrace)
    }

    pub fn is_closing_bracket(&self) -> bool {
        matches!(self, TokenKind::RPar | TokenKind::RSqb | TokenKind::RBrace)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Whitespace and comments between the previous token and this one.
    pub prefix: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {:?}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Name && self.value == keyword
    }

    /// A name token that is not a reserved word.
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Name && !KEYWORDS.contains(self.value.as_str())
    }
}
