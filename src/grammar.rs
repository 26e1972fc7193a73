//! Regular grammars with named variables
//!
//! A grammar looks like a regular expression with named groups:
//!
//! ```text
//! cd \s+ (?P<dir>[^\s]+)
//! ```
//!
//! Compiling it yields a [`CompiledGrammar`] that can match complete input
//! ([`CompiledGrammar::match_exact`]) or the possibly-incomplete text in
//! front of a cursor ([`CompiledGrammar::match_prefix`]). A [`Match`] tells
//! which variables the input binds, which of them the cursor is inside, and
//! whether text at the end has fallen outside the grammar.
//!
//! The pipeline is tokenizer, parser, compiler; trees can also be built
//! programmatically from [`Node`] values and compiled with
//! [`CompiledGrammar::from_node`].

pub mod ast;
pub mod compiler;
pub mod error;
pub mod matching;
pub mod parser;
pub mod tokenizer;

pub use ast::Node;
pub use compiler::{compile, compile_with_funcs, CompiledGrammar, EscapeFunc, EscapeFuncMap};
pub use error::GrammarError;
pub use matching::{Match, MatchVariable, Variables, TRAILING_INPUT_VARNAME};
