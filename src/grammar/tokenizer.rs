//! Tokenizer for grammar expressions
//!
//! Grammar expressions use regex syntax extended with named groups, verbose
//! whitespace and `#` comments. The tokenizer is defined entirely with the
//! logos derive macro: whitespace and comments are skip patterns, and a
//! character class `[...]` is consumed as a single token, which is why
//! whitespace inside brackets survives while all other whitespace is
//! dropped.
//!
//! Unrecognized `(?...)` forms (`(?<=`, `(?i`, `(?#`, back references, ...)
//! deliberately lex to [`Token::UnknownGroupOpen`] so that the parser can
//! reject them as unsupported constructs rather than as syntax errors.

use logos::Logos;

use super::error::GrammarError;

/// All tokens a grammar expression can contain.
///
/// Priority is mostly driven by maximal munch: `(?P<name>` beats `(?`,
/// `*?` beats `*`. The single-character catch-all sits at priority 0 so it
/// only fires when nothing else matches.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"\s+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    /// `(?P<name>` — start of a named capture group.
    #[regex(r"\(\?P<[a-zA-Z0-9_-]+>", |lex| {
        let slice = lex.slice();
        slice[4..slice.len() - 1].to_string()
    })]
    NamedGroupOpen(String),

    /// `(?:` — start of a non-capturing group.
    #[token("(?:")]
    NonCapturingGroupOpen,

    /// `(?!` — start of a negative lookahead assertion.
    #[token("(?!")]
    NegativeLookaheadOpen,

    /// `(?=` — start of a positive lookahead assertion. Parsed
    /// structurally; the compiler rejects it.
    #[token("(?=")]
    LookaheadOpen,

    /// Any other `(?...)` form. Always rejected as unsupported.
    #[token("(?")]
    UnknownGroupOpen,

    #[token("(")]
    GroupOpen,

    #[token(")")]
    GroupClose,

    #[token("*?")]
    StarLazy,

    #[token("+?")]
    PlusLazy,

    #[token("??")]
    QuestionLazy,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    #[token("|")]
    Pipe,

    /// `{...}` brace repetition. Recognized as a token here; the parser
    /// rejects it as an unsupported construct.
    #[regex(r"\{[^{}]*\}", |lex| lex.slice().to_string())]
    BraceRepeat(String),

    /// A whole `[...]` character class, whitespace and all.
    #[regex(r"\[([^\]\\]|\\[\s\S])*\]", |lex| lex.slice().to_string())]
    CharClass(String),

    /// An escaped character, e.g. `\s`, `\.`, `\ `.
    #[regex(r"\\[\s\S]", |lex| lex.slice().to_string())]
    Escaped(String),

    /// Any other single character, passed through as a regex fragment.
    #[regex(r"[^\s#]", |lex| lex.slice().to_string(), priority = 0)]
    Literal(String),
}

/// Tokenize a grammar expression into a flat token list.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, GrammarError> {
    let mut lexer = Token::lexer(expression);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(GrammarError::syntax(format!(
                    "could not tokenize grammar expression at offset {}",
                    lexer.span().start
                )))
            }
        }
    }

    Ok(tokens)
}
