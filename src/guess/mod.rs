//! Lazy type guessing.
//!
//! `guess::guess` gives the best known semantic type of an entity: an ordered
//! table of override rules is tried first, then values delegate to what they
//! are bound to and everything else is its own guess.

pub mod guess;
pub mod rules;

#[cfg(test)]
mod tests;
