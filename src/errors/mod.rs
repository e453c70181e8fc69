//! Error types and error handling for the formula front end.
//!
//! This module defines the error types used by every stage:
//!
//! - Error structures with source position information
//! - Syntax errors raised while tokenizing and building the tree
//! - Conversion errors (unsupported constructs, malformed shapes,
//!   undefined names, bad formula signatures)
//! - The offending node's kind and exact source text for diagnostics

pub mod errors;

#[cfg(test)]
mod tests;
