//! Syntax highlighting through a grammar
//!
//! [`GrammarLexer`] assigns styles per character: everything starts out in
//! the default style, each matched variable is re-lexed by the lexer
//! registered under its name, and input past the end of the grammar is
//! forced into the trailing-input style. Adjacent characters with the same
//! style are then folded into [`Fragment`] runs per line.
//!
//! Variable lexers only ever *refine* the default style; a character
//! already styled by an earlier variable keeps its style. The trailing
//! style wins unconditionally, so broken input stays visibly broken.

use std::collections::HashMap;
use std::sync::Arc;

use crate::document::Document;
use crate::grammar::CompiledGrammar;

/// Style applied to input that no longer follows the grammar.
pub const TRAILING_INPUT_STYLE: &str = "class:trailing-input";

/// A run of equally styled text within one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub style: String,
    pub text: String,
}

impl Fragment {
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Fragment {
        Fragment {
            style: style.into(),
            text: text.into(),
        }
    }
}

/// A fully styled document, addressable per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedDocument {
    lines: Vec<Vec<Fragment>>,
}

impl LexedDocument {
    pub fn new(lines: Vec<Vec<Fragment>>) -> LexedDocument {
        LexedDocument { lines }
    }

    /// Fragments of line `number`; empty for lines past the end.
    pub fn line(&self, number: usize) -> &[Fragment] {
        self.lines.get(number).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Anything that can style a document.
pub trait Lexer {
    fn lex_document(&self, document: &Document) -> LexedDocument;
}

/// Lexer giving every character the same style. Useful as the leaf lexer
/// for grammar variables that need just one color.
#[derive(Debug, Clone, Default)]
pub struct SimpleLexer {
    style: String,
}

impl SimpleLexer {
    pub fn new(style: impl Into<String>) -> SimpleLexer {
        SimpleLexer {
            style: style.into(),
        }
    }
}

impl Lexer for SimpleLexer {
    fn lex_document(&self, document: &Document) -> LexedDocument {
        let lines = document
            .lines()
            .into_iter()
            .map(|line| {
                if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Fragment::new(self.style.clone(), line)]
                }
            })
            .collect();
        LexedDocument::new(lines)
    }
}

/// Lexer dispatching on grammar variables.
pub struct GrammarLexer {
    grammar: Arc<CompiledGrammar>,
    default_style: String,
    lexers: HashMap<String, Box<dyn Lexer>>,
}

impl GrammarLexer {
    pub fn new(grammar: Arc<CompiledGrammar>, lexers: HashMap<String, Box<dyn Lexer>>) -> Self {
        GrammarLexer {
            grammar,
            default_style: String::new(),
            lexers,
        }
    }

    /// Style for characters not covered by any variable lexer.
    pub fn with_default_style(mut self, style: impl Into<String>) -> Self {
        self.default_style = style.into();
        self
    }

    /// One style per character of `text`.
    fn style_cells(&self, text: &str) -> Vec<String> {
        let matched = match self.grammar.match_prefix(text) {
            Some(matched) => matched,
            // Nothing matched at all; leave the whole input unstyled.
            None => return text.chars().map(|_| String::new()).collect(),
        };

        let mut cells: Vec<String> = text.chars().map(|_| self.default_style.clone()).collect();

        for variable in matched.variables() {
            let lexer = match self.lexers.get(&variable.varname) {
                Some(lexer) => lexer,
                None => continue,
            };

            // Lex the raw slice as it appears on screen; the unescaped
            // value can differ in length, which would shear the styles off
            // their characters.
            let raw: String = text
                .chars()
                .skip(variable.start)
                .take(variable.stop - variable.start)
                .collect();
            let inner = Document::at_end(raw);
            let lexed = lexer.lex_document(&inner);

            let mut cell = variable.start;
            for line in 0..lexed.line_count() {
                // The newline separating inner lines occupies a cell too.
                if line > 0 {
                    cell += 1;
                }
                for fragment in lexed.line(line) {
                    for _ in fragment.text.chars() {
                        if cell >= cells.len() {
                            break;
                        }
                        if cells[cell] == self.default_style {
                            cells[cell] = fragment.style.clone();
                        }
                        cell += 1;
                    }
                }
            }
        }

        if let Some(trailing) = matched.trailing_input() {
            for cell in cells.iter_mut().take(trailing.stop).skip(trailing.start) {
                *cell = TRAILING_INPUT_STYLE.to_string();
            }
        }

        cells
    }
}

impl Lexer for GrammarLexer {
    fn lex_document(&self, document: &Document) -> LexedDocument {
        let text = document.text();
        let cells = self.style_cells(text);

        let mut lines: Vec<Vec<Fragment>> = vec![Vec::new()];
        for (ch, style) in text.chars().zip(cells) {
            if ch == '\n' {
                lines.push(Vec::new());
                continue;
            }
            match lines.last_mut().and_then(|line| line.last_mut()) {
                Some(fragment) if fragment.style == style => fragment.text.push(ch),
                _ => {
                    if let Some(line) = lines.last_mut() {
                        line.push(Fragment::new(style, ch.to_string()));
                    }
                }
            }
        }

        LexedDocument::new(lines)
    }
}
