//! Lexical analysis for formula source.
//!
//! This module contains the tokenizer that turns formula source text into
//! the token stream consumed by the tree builder. It handles:
//!
//! - Tokenization using anchored regex patterns
//! - Names, numbers and strings (kept verbatim, prefixes and quotes included)
//! - Indentation, producing indent / dedent tokens
//! - Whitespace and comments, preserved as the prefix of the next token

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
