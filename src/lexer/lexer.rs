use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{errors::errors::{Error, ErrorImpl}, Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN};

use super::tokens::{Token, TokenKind};

pub type RegexHandler = fn(&mut Lexer, &Regex);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Self {
        RegexPattern {
            regex: Regex::new(pattern).unwrap_or_else(|error| panic!("invalid token pattern {:?}: {}", pattern, error)),
            handler,
        }
    }
}

lazy_static! {
    /// Token patterns, tried in order at the current position. Every pattern is anchored.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern::new(r"^\r?\n", newline_handler),
        RegexPattern::new(r"^\\\r?\n", skip_handler),
        RegexPattern::new(r"^[ \t\x0c]+", skip_handler),
        RegexPattern::new(r"^#[^\r\n]*", skip_handler),
        RegexPattern::new(
            r#"^(?i:[ubr]{0,2})(?:"""(?s:.*?)"""|'''(?s:.*?)'''|"(?:[^"\\\r\n]|\\.)*"|'(?:[^'\\\r\n]|\\.)*')"#,
            string_handler,
        ),
        RegexPattern::new(r"^0(?:[xX][0-9a-fA-F]+|[oO][0-7]+|[bB][01]+)[lL]?", number_handler),
        RegexPattern::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?[lLjJ]?", number_handler),
        RegexPattern::new(r"^[a-zA-Z_][a-zA-Z0-9_]*", name_handler),
        RegexPattern::new(r"^\*\*", MK_DEFAULT_HANDLER!(TokenKind::DoubleStar, "**")),
        RegexPattern::new(r"^//", MK_DEFAULT_HANDLER!(TokenKind::DoubleSlash, "//")),
        RegexPattern::new(r"^==", MK_DEFAULT_HANDLER!(TokenKind::EqEqual, "==")),
        RegexPattern::new(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEqual, "!=")),
        RegexPattern::new(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEqual, "<=")),
        RegexPattern::new(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEqual, ">=")),
        RegexPattern::new(r"^\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEqual, "+=")),
        RegexPattern::new(r"^-=", MK_DEFAULT_HANDLER!(TokenKind::MinEqual, "-=")),
        RegexPattern::new(r"^\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEqual, "*=")),
        RegexPattern::new(r"^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEqual, "/=")),
        RegexPattern::new(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::LPar, "(")),
        RegexPattern::new(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::RPar, ")")),
        RegexPattern::new(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::LSqb, "[")),
        RegexPattern::new(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::RSqb, "]")),
        RegexPattern::new(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::LBrace, "{")),
        RegexPattern::new(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::RBrace, "}")),
        RegexPattern::new(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        RegexPattern::new(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        RegexPattern::new(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        RegexPattern::new(r"^@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
        RegexPattern::new(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Equal, "=")),
        RegexPattern::new(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        RegexPattern::new(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Minus, "-")),
        RegexPattern::new(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        RegexPattern::new(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        RegexPattern::new(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        RegexPattern::new(r"^~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
        RegexPattern::new(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        RegexPattern::new(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        RegexPattern::new(r"^&", MK_DEFAULT_HANDLER!(TokenKind::Amper, "&")),
        RegexPattern::new(r"^\|", MK_DEFAULT_HANDLER!(TokenKind::VBar, "|")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
    /// Skipped text waiting to be attached to the next token.
    prefix: String,
    /// Column widths of the open indentation levels.
    indents: Vec<usize>,
    /// Bracket nesting; newlines and indentation are plain whitespace inside brackets.
    depth: usize,
    at_line_start: bool,
}

enum LineStart {
    Blank(usize),
    Code(String),
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("<formula>"))
        };

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            file: file_name,
            prefix: String::new(),
            indents: vec![],
            depth: 0,
            at_line_start: true,
        }
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn position(&self, offset: usize) -> Position {
        Position(offset as u32, Rc::clone(&self.file))
    }

    /// Pushes a token whose text starts at the current position and advances past it.
    pub fn push_token(&mut self, kind: TokenKind, value: String) {
        if kind.is_opening_bracket() {
            self.depth += 1;
        } else if kind.is_closing_bracket() {
            self.depth = self.depth.saturating_sub(1);
        }

        let span = Span {
            start: self.position(self.pos),
            end: self.position(self.pos + value.len()),
        };
        let prefix = std::mem::take(&mut self.prefix);
        self.pos += value.len();
        self.tokens.push(MK_TOKEN!(kind, value, prefix, span));
    }

    /// Moves `n` bytes of source into the pending prefix.
    pub fn skip(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        self.prefix.push_str(&self.source[self.pos..end]);
        self.pos = end;
    }

    fn current_indent(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    fn classify_line_start(&self) -> LineStart {
        let rest = self.remainder();
        let width = rest.len() - rest.trim_start_matches([' ', '\t', '\x0c']).len();
        let after = &rest[width..];

        if after.is_empty() {
            LineStart::Blank(width)
        } else if after.starts_with('\n') || after.starts_with('\r') || after.starts_with('#') {
            match after.find('\n') {
                Some(newline) => LineStart::Blank(width + newline + 1),
                None => LineStart::Blank(rest.len()),
            }
        } else {
            LineStart::Code(rest[..width].to_string())
        }
    }

    /// Emits indentation tokens for the logical line starting at the current position.
    fn handle_line_start(&mut self) -> Result<(), Error> {
        let indent = match self.classify_line_start() {
            LineStart::Blank(length) => {
                self.skip(length);
                return Ok(());
            }
            LineStart::Code(indent) => indent,
        };

        let width = indent_width(&indent);

        if width > self.current_indent() {
            self.indents.push(width);
            self.push_token(TokenKind::Indent, indent);
        } else {
            while width < self.current_indent() {
                self.indents.pop();
                self.push_token(TokenKind::Dedent, String::new());
            }

            if width != self.current_indent() {
                return Err(Error::new(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: indent.clone(),
                        message: String::from("unindent does not match any outer indentation level"),
                    },
                    self.position(self.pos),
                ));
            }

            self.skip(indent.len());
        }

        self.at_line_start = false;
        Ok(())
    }

    fn finish(&mut self) {
        if !self.at_line_start {
            self.push_token(TokenKind::Newline, String::new());
        }

        while self.indents.pop().is_some() {
            self.push_token(TokenKind::Dedent, String::new());
        }

        self.push_token(TokenKind::EndMarker, String::new());
    }
}

/// Column reached by `indent`. Tabs advance to the next multiple of 8 and a
/// form feed resets the column.
pub fn indent_width(indent: &str) -> usize {
    indent.chars().fold(0, |column, c| match c {
        '\t' => (column / 8 + 1) * 8,
        '\x0c' => 0,
        _ => column + 1,
    })
}

fn matched_text(lexer: &Lexer, regex: &Regex) -> String {
    regex
        .find(lexer.remainder())
        .map(|found| found.as_str().to_string())
        .unwrap_or_default()
}

fn newline_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);

    if lexer.depth > 0 {
        lexer.skip(matched.len());
    } else {
        lexer.push_token(TokenKind::Newline, matched);
        lexer.at_line_start = true;
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);
    lexer.skip(matched.len());
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);
    lexer.push_token(TokenKind::String, matched);
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);
    lexer.push_token(TokenKind::Number, matched);
}

fn name_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = matched_text(lexer, regex);
    lexer.push_token(TokenKind::Name, matched);
}

/// Splits formula source into tokens.
///
/// Concatenating `prefix + value` of every returned token reproduces `source` exactly.
pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        if lex.at_line_start && lex.depth == 0 {
            lex.handle_line_start()?;
            continue;
        }

        let mut matched = false;

        for pattern in PATTERNS.iter() {
            if pattern.regex.is_match(lex.remainder()) {
                (pattern.handler)(&mut lex, &pattern.regex);
                matched = true;
                break;
            }
        }

        if !matched {
            let token = lex.remainder().chars().next().map(String::from).unwrap_or_default();
            return Err(Error::new(ErrorImpl::UnrecognisedToken { token }, lex.position(lex.pos)));
        }
    }

    lex.finish();
    Ok(lex.tokens)
}
