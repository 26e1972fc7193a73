//! Error types for grammar compilation
//!
//! Compilation distinguishes two failure classes so that callers can tell
//! "your grammar is malformed" apart from "your grammar uses a feature this
//! engine deliberately does not implement". Matching never fails: a
//! non-matching input is a normal outcome during interactive typing and is
//! reported as `None`, not as an error.

use std::fmt;

/// Error produced while compiling a grammar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The grammar expression is malformed: unmatched or unclosed groups,
    /// a quantifier with nothing to repeat, untokenizable input, or a
    /// literal fragment the regex engine rejects.
    Syntax(String),

    /// The grammar uses a construct that is recognized but intentionally
    /// unsupported: positive lookahead `(?=...)`, brace repetition `{n,m}`,
    /// or any other `(?...)` group form.
    Unsupported(String),
}

impl GrammarError {
    /// Shorthand used by the tokenizer, parser and compiler.
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        GrammarError::Syntax(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        GrammarError::Unsupported(message.into())
    }

    /// True for malformed-grammar errors.
    pub fn is_syntax(&self) -> bool {
        matches!(self, GrammarError::Syntax(_))
    }

    /// True for deliberately-unimplemented-construct errors.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, GrammarError::Unsupported(_))
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::Syntax(msg) => write!(f, "grammar syntax error: {}", msg),
            GrammarError::Unsupported(msg) => write!(f, "unsupported grammar construct: {}", msg),
        }
    }
}

impl std::error::Error for GrammarError {}
