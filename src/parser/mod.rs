//! Parser module for building the concrete syntax tree.
//!
//! This module contains the tree builder that transforms a stream of tokens
//! into a lossless concrete syntax tree. It handles:
//!
//! - Statement parsing (definitions, control flow, assignments, returns)
//! - Expression parsing through table-driven precedence levels
//! - Collapsing of single-child grammar nodes
//! - Error reporting on unexpected tokens
//!
//! The converter consumes the produced tree; nothing here interprets it.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;

#[cfg(test)]
mod tests;
