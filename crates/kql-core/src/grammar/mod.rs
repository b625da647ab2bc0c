//! Grammar definitions.
//!
//! A [`Grammar`] is a list of named [`Rule`] trees in the shape tree-sitter's
//! `grammar.json` uses. Grammars are written in Rust with the [`dsl`] helpers
//! or read from JSON, and stored compactly with postcard.

pub mod dsl;

mod binary;
mod json;
mod types;

#[cfg(test)]
mod binary_tests;

pub use types::{Grammar, Rule};
