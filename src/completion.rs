//! Completion through a grammar
//!
//! [`GrammarCompleter`] routes completion requests to per-variable
//! completers: it prefix-matches the text before the cursor, and for every
//! variable the cursor is inside, hands that variable's partial value to
//! the completer registered under its name. The per-variable completers are
//! ordinary [`Completer`] implementations and know nothing about the
//! surrounding grammar.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::document::Document;
use crate::grammar::CompiledGrammar;

/// One proposed completion.
///
/// `start_position` is relative to the cursor and never positive: `-2`
/// means "replace the two characters before the cursor with `text`".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub start_position: isize,
    pub display: Option<String>,
    pub display_meta: Option<String>,
    pub style: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>, start_position: isize) -> Completion {
        Completion {
            text: text.into(),
            start_position,
            display: None,
            display_meta: None,
            style: None,
        }
    }
}

/// Anything that can propose completions for a document.
pub trait Completer {
    fn get_completions(&self, document: &Document) -> Vec<Completion>;
}

/// Completer dispatching on grammar variables.
pub struct GrammarCompleter {
    grammar: Arc<CompiledGrammar>,
    completers: HashMap<String, Box<dyn Completer>>,
}

impl GrammarCompleter {
    pub fn new(
        grammar: Arc<CompiledGrammar>,
        completers: HashMap<String, Box<dyn Completer>>,
    ) -> GrammarCompleter {
        GrammarCompleter {
            grammar,
            completers,
        }
    }
}

impl Completer for GrammarCompleter {
    fn get_completions(&self, document: &Document) -> Vec<Completion> {
        let matched = match self.grammar.match_prefix(document.text_before_cursor()) {
            Some(matched) => matched,
            None => return Vec::new(),
        };

        let mut seen: HashSet<(String, isize)> = HashSet::new();
        let mut completions = Vec::new();

        for variable in matched.end_nodes() {
            let completer = match self.completers.get(&variable.varname) {
                Some(completer) => completer,
                None => continue,
            };

            // End nodes carry the raw input substring; the completer only
            // ever sees the unescaped form.
            let unwrapped = self.grammar.unescape(&variable.varname, &variable.value);
            let raw_len = variable.value.chars().count() as isize;
            let unwrapped_len = unwrapped.chars().count() as isize;
            let inner = Document::at_end(unwrapped);

            for completion in completer.get_completions(&inner) {
                let text = self.grammar.escape(&variable.varname, &completion.text);
                // Shift from the unescaped value back into raw input
                // coordinates, still relative to the outer cursor. A longer
                // raw form pushes the replacement start further back.
                let start_position = completion.start_position - (raw_len - unwrapped_len);

                // Several automata can propose the same replacement.
                if seen.insert((text.clone(), start_position)) {
                    completions.push(Completion {
                        text,
                        start_position,
                        display: completion.display,
                        display_meta: completion.display_meta,
                        style: completion.style,
                    });
                }
            }
        }

        completions
    }
}
