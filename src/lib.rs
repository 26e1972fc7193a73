//! # regline
//!
//! Regex-like grammars with named variables for interactive line editors.
//!
//! An application declares a small grammar for its input language:
//!
//! ```text
//! cd \s+ (?P<dir>[^\s]+)
//! ```
//!
//! The grammar is compiled once; on every keystroke the engine tells the
//! application which variable the cursor is inside, what partial value it
//! holds, and whether text at the end has fallen outside the grammar. That
//! is what drives context-sensitive completion ([`GrammarCompleter`]),
//! highlighting ([`GrammarLexer`]) and accept-time validation
//! ([`GrammarValidator`]).
//!
//! ```
//! use regline::{compile, Document};
//!
//! let grammar = compile(r"cd \s+ (?P<dir>[^\s]+)").unwrap();
//!
//! let m = grammar.match_exact("cd /home").unwrap();
//! assert_eq!(m.variables().get("dir"), Some("/home"));
//!
//! // While typing, prefix matching keeps every possible path open.
//! let m = grammar.match_prefix("cd /ho").unwrap();
//! assert_eq!(m.end_nodes()[0].varname, "dir");
//! ```

pub mod completion;
pub mod document;
pub mod grammar;
pub mod highlight;
pub mod validation;

pub use completion::{Completer, Completion, GrammarCompleter};
pub use document::Document;
pub use grammar::{
    compile, compile_with_funcs, CompiledGrammar, EscapeFunc, EscapeFuncMap, GrammarError, Match,
    MatchVariable, Node, Variables, TRAILING_INPUT_VARNAME,
};
pub use highlight::{
    Fragment, GrammarLexer, LexedDocument, Lexer, SimpleLexer, TRAILING_INPUT_STYLE,
};
pub use validation::{GrammarValidator, ValidationError, Validator};
