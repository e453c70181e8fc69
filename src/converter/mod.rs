//! Conversion of the concrete syntax tree into entities.
//!
//! Every construct is checked against the exact shape the formula subset
//! allows. Anything else fails with `UnsupportedConstruct` or `MalformedShape`;
//! boolean, arithmetic and comparison expressions are accepted and left as
//! `Unimplemented` placeholders.

pub mod converter;
pub mod expr;
pub mod stmt;
