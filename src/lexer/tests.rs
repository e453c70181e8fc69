//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Names, keywords and identifiers
//! - Numeric and string literals, kept verbatim
//! - Operators and punctuation
//! - Indentation and bracket continuation
//! - Prefix preservation and error cases

use super::{
    lexer::{indent_width, tokenize},
    tokens::TokenKind,
};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.py".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_names_and_keywords() {
    let source = "def foo return period".to_string();
    let tokens = tokenize(source, Some("test.py".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Name);
    assert!(tokens[0].is_keyword("def"));
    assert!(!tokens[0].is_identifier());
    assert_eq!(tokens[1].value, "foo");
    assert!(tokens[1].is_identifier());
    assert!(tokens[2].is_keyword("return"));
    assert_eq!(tokens[3].value, "period");
    assert_eq!(tokens[4].kind, TokenKind::Newline);
    assert_eq!(tokens[4].value, "");
    assert_eq!(tokens[5].kind, TokenKind::EndMarker);
}

#[test]
fn test_tokenize_numbers_verbatim() {
    let source = "42 0.25 1e3 .5 3.".to_string();
    let tokens = tokenize(source, Some("test.py".to_string())).unwrap();

    let values: Vec<&str> = tokens[..5].iter().map(|token| token.value.as_str()).collect();
    assert_eq!(values, vec!["42", "0.25", "1e3", ".5", "3."]);
    assert!(tokens[..5].iter().all(|token| token.kind == TokenKind::Number));
}

#[test]
fn test_tokenize_strings_verbatim() {
    let source = r#"u"impôt" 'single' """triple""" r'\d' "esc\"aped""#.to_string();
    let tokens = tokenize(source, Some("test.py".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "u\"impôt\"");
    assert_eq!(tokens[1].value, "'single'");
    assert_eq!(tokens[2].value, "\"\"\"triple\"\"\"");
    assert_eq!(tokens[3].value, "r'\\d'");
    assert_eq!(tokens[4].value, "\"esc\\\"aped\"");
}

#[test]
fn test_tokenize_identifier_starting_like_string_prefix() {
    let tokens = tokenize("user bar".to_string(), None).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Name);
    assert_eq!(tokens[0].value, "user");
    assert_eq!(tokens[1].value, "bar");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("a ** b // c == d != e <= f >= g += h -= i *= j /= k"),
        vec![
            TokenKind::Name,
            TokenKind::DoubleStar,
            TokenKind::Name,
            TokenKind::DoubleSlash,
            TokenKind::Name,
            TokenKind::EqEqual,
            TokenKind::Name,
            TokenKind::NotEqual,
            TokenKind::Name,
            TokenKind::LessEqual,
            TokenKind::Name,
            TokenKind::GreaterEqual,
            TokenKind::Name,
            TokenKind::PlusEqual,
            TokenKind::Name,
            TokenKind::MinEqual,
            TokenKind::Name,
            TokenKind::StarEqual,
            TokenKind::Name,
            TokenKind::SlashEqual,
            TokenKind::Name,
            TokenKind::Newline,
            TokenKind::EndMarker,
        ]
    );
}

#[test]
fn test_tokenize_prefixed_integers() {
    let source = "0x10 0o17 0b101 0XffL 0.5".to_string();
    let tokens = tokenize(source, None).unwrap();

    let values: Vec<&str> = tokens[..5].iter().map(|token| token.value.as_str()).collect();
    assert_eq!(values, vec!["0x10", "0o17", "0b101", "0XffL", "0.5"]);
    assert!(tokens[..5].iter().all(|token| token.kind == TokenKind::Number));
}

#[test]
fn test_tokenize_braces_join_lines() {
    assert_eq!(
        kinds("x = {1: a,\n     2: b}\n"),
        vec![
            TokenKind::Name,
            TokenKind::Equal,
            TokenKind::LBrace,
            TokenKind::Number,
            TokenKind::Colon,
            TokenKind::Name,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::Colon,
            TokenKind::Name,
            TokenKind::RBrace,
            TokenKind::Newline,
            TokenKind::EndMarker,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("@f(a[0], b.c): x = ~y & z | w % v"),
        vec![
            TokenKind::At,
            TokenKind::Name,
            TokenKind::LPar,
            TokenKind::Name,
            TokenKind::LSqb,
            TokenKind::Number,
            TokenKind::RSqb,
            TokenKind::Comma,
            TokenKind::Name,
            TokenKind::Dot,
            TokenKind::Name,
            TokenKind::RPar,
            TokenKind::Colon,
            TokenKind::Name,
            TokenKind::Equal,
            TokenKind::Tilde,
            TokenKind::Name,
            TokenKind::Amper,
            TokenKind::Name,
            TokenKind::VBar,
            TokenKind::Name,
            TokenKind::Percent,
            TokenKind::Name,
            TokenKind::Newline,
            TokenKind::EndMarker,
        ]
    );
}

#[test]
fn test_tokenize_indentation() {
    let source = "def f(a):\n    x = a\n    return x\n";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Name,
            TokenKind::Name,
            TokenKind::LPar,
            TokenKind::Name,
            TokenKind::RPar,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Name,
            TokenKind::Equal,
            TokenKind::Name,
            TokenKind::Newline,
            TokenKind::Name,
            TokenKind::Name,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::EndMarker,
        ]
    );
}

#[test]
fn test_tokenize_blank_and_comment_lines_are_prefix() {
    let source = "x = 1\n\n    # note\ny = 2\n".to_string();
    let tokens = tokenize(source, None).unwrap();

    // No indent is produced by the indented comment line.
    assert!(tokens.iter().all(|token| token.kind != TokenKind::Indent));
    let y = tokens.iter().find(|token| token.value == "y").unwrap();
    assert_eq!(y.prefix, "\n    # note\n");
}

#[test]
fn test_tokenize_brackets_join_lines() {
    let source = "f(a,\n      b)\n";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Name,
            TokenKind::LPar,
            TokenKind::Name,
            TokenKind::Comma,
            TokenKind::Name,
            TokenKind::RPar,
            TokenKind::Newline,
            TokenKind::EndMarker,
        ]
    );
}

#[test]
fn test_tokenize_round_trips_source() {
    let source = "class A(B):\n    def f(self, s, p):  # formula\n        return p.start\n\n# end\n";
    let tokens = tokenize(source.to_string(), None).unwrap();

    let rebuilt: String = tokens
        .iter()
        .map(|token| format!("{}{}", token.prefix, token.value))
        .collect();
    assert_eq!(rebuilt, source);
}

#[test]
fn test_tokenize_positions() {
    let tokens = tokenize("ab = 12".to_string(), Some("test.py".to_string())).unwrap();

    assert_eq!(tokens[2].span.start.0, 5);
    assert_eq!(tokens[2].span.end.0, 7);
    assert_eq!(tokens[2].span.start.1.as_str(), "test.py");
}

#[test]
fn test_tokenize_inconsistent_dedent() {
    let source = "if a:\n        b = 1\n    c = 2\n".to_string();
    let error = tokenize(source, None).err().unwrap();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_indent_width_expands_tabs() {
    assert_eq!(indent_width("    "), 4);
    assert_eq!(indent_width("\t"), 8);
    assert_eq!(indent_width("  \t"), 8);
    assert_eq!(indent_width("\t  "), 10);
    assert_eq!(indent_width("  \x0c  "), 2);
}

#[test]
fn test_tokenize_tab_indented_body() {
    let source = "class A(B):\n    def f(self):\n\treturn 1\n    def g(self):\n\treturn 2\n".to_string();
    let tokens = tokenize(source, None).unwrap();

    let indents = tokens.iter().filter(|token| token.kind == TokenKind::Indent).count();
    let dedents = tokens.iter().filter(|token| token.kind == TokenKind::Dedent).count();
    assert_eq!(indents, 3);
    assert_eq!(dedents, 3);
}

#[test]
fn test_tokenize_unrecognized_token() {
    let source = "x = $".to_string();
    let error = tokenize(source, Some("test.py".to_string())).err().unwrap();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 4);
}

#[test]
fn test_tokenize_empty_source() {
    assert_eq!(kinds(""), vec![TokenKind::EndMarker]);
}
