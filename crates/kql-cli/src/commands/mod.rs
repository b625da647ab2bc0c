pub mod check;
pub mod common;
pub mod edit;
pub mod parse;
pub mod table;
pub mod tokens;

#[cfg(test)]
mod tokens_tests;
