//! Utility macros for the formula front end.
//!
//! This module defines helper macros used throughout the crate:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for fixed tokens
//! - `ENSURE_SHAPE!` - Fails conversion with a `MalformedShape` error
//!
//! These macros reduce boilerplate in the lexer and the converter.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's source text
/// * `$prefix` - Whitespace and comments preceding the token
/// * `$span` - The source span
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Number, "42".to_string(), String::new(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $prefix:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            prefix: $prefix,
            span: $span,
        }
    };
}

/// Creates a default lexer handler for fixed-text tokens.
///
/// Generates a handler function that pushes a token of the given kind
/// and advances the lexer position by the token's length.
///
/// # Example
///
/// ```ignore
/// RegexPattern::new(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"))
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            lexer.push_token($kind, String::from($value));
        }
    };
}

/// Returns a `MalformedShape` error located on `$node` unless `$cond` holds.
///
/// Expects `Error` and `ErrorImpl` to be in scope at the call site.
///
/// # Example
///
/// ```ignore
/// ENSURE_SHAPE!(node.children.len() == 5, node, "5 children");
/// ```
#[macro_export]
macro_rules! ENSURE_SHAPE {
    ($cond:expr, $node:expr, $expected:expr) => {
        if !$cond {
            return Err(Error::at_node(
                ErrorImpl::malformed(&$node.kind, $expected),
                &$node,
            ));
        }
    };
}
