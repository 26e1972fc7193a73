//! Match results and variable bindings
//!
//! A [`Match`] aggregates the captures of every automaton that accepted the
//! input. Spans are reported as character offsets into the input, which is
//! what cursor arithmetic in documents uses; the byte offsets the regex
//! engine produces stay internal.

use std::fmt;
use std::ops::Index;

use serde::Serialize;

use super::compiler::CompiledGrammar;

/// Variable name under which trailing input is reported. Angle brackets
/// keep it out of the grammar's own namespace.
pub const TRAILING_INPUT_VARNAME: &str = "<trailing_input>";

/// Result of matching an input string against a compiled grammar.
#[derive(Debug)]
pub struct Match<'g> {
    grammar: &'g CompiledGrammar,
    input: String,
    /// `(varname, byte start, byte stop)`, in match order, deduplicated.
    var_regs: Vec<(String, usize, usize)>,
    trailing: Option<(usize, usize)>,
}

impl<'g> Match<'g> {
    pub(crate) fn new(
        grammar: &'g CompiledGrammar,
        input: String,
        var_regs: Vec<(String, usize, usize)>,
        trailing: Vec<(usize, usize)>,
    ) -> Self {
        // Ambiguous grammars bind the same span through several automata;
        // one binding per (name, span) is enough.
        let mut deduped: Vec<(String, usize, usize)> = Vec::with_capacity(var_regs.len());
        for reg in var_regs {
            if !deduped.contains(&reg) {
                deduped.push(reg);
            }
        }

        // The largest start wins: less trailing text means more of the
        // input was claimed by the grammar.
        let trailing = trailing
            .iter()
            .map(|&(start, _)| start)
            .max()
            .zip(trailing.iter().map(|&(_, stop)| stop).max());

        Match {
            grammar,
            input,
            var_regs: deduped,
            trailing,
        }
    }

    /// The input string this match was produced from.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// All variable bindings, with unescape functions applied.
    pub fn variables(&self) -> Variables {
        Variables {
            tuples: self
                .var_regs
                .iter()
                .map(|(varname, start, stop)| self.match_variable(varname, *start, *stop))
                .collect(),
        }
    }

    /// The bindings whose span ends exactly at the end of the input: the
    /// variables the cursor is currently sitting inside. This is the entry
    /// point for completion. Values are the raw input substrings; callers
    /// that want the unescaped form go through
    /// [`CompiledGrammar::unescape`](super::CompiledGrammar::unescape).
    pub fn end_nodes(&self) -> Vec<MatchVariable> {
        self.var_regs
            .iter()
            .filter(|(_, _, stop)| *stop == self.input.len())
            .map(|(varname, start, stop)| {
                let value = self.input[*start..*stop].to_string();
                let (start, stop) = self.char_span(*start, *stop);
                MatchVariable {
                    varname: varname.to_string(),
                    value,
                    start,
                    stop,
                }
            })
            .collect()
    }

    /// Input past the point where the grammar stopped matching, if any,
    /// as a synthetic variable named [`TRAILING_INPUT_VARNAME`].
    pub fn trailing_input(&self) -> Option<MatchVariable> {
        let (start, stop) = self.trailing?;
        if start == stop {
            return None;
        }
        let value = self.input[start..stop].to_string();
        let (start, stop) = self.char_span(start, stop);
        Some(MatchVariable {
            varname: TRAILING_INPUT_VARNAME.to_string(),
            value,
            start,
            stop,
        })
    }

    fn match_variable(&self, varname: &str, start: usize, stop: usize) -> MatchVariable {
        let value = self.grammar.unescape(varname, &self.input[start..stop]);
        let (start, stop) = self.char_span(start, stop);
        MatchVariable {
            varname: varname.to_string(),
            value,
            start,
            stop,
        }
    }

    fn char_span(&self, start: usize, stop: usize) -> (usize, usize) {
        (
            char_index(&self.input, start),
            char_index(&self.input, stop),
        )
    }
}

fn char_index(input: &str, byte_index: usize) -> usize {
    input[..byte_index].chars().count()
}

/// One bound variable: name, unescaped value, and character span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchVariable {
    pub varname: String,
    pub value: String,
    pub start: usize,
    pub stop: usize,
}

impl MatchVariable {
    pub fn slice(&self) -> (usize, usize) {
        (self.start, self.stop)
    }
}

impl fmt::Display for MatchVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.varname, self.value)
    }
}

/// The variable bindings of a [`Match`]. An ambiguous grammar can bind the
/// same name more than once; [`get`](Variables::get) returns the first
/// binding, [`get_all`](Variables::get_all) all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variables {
    tuples: Vec<MatchVariable>,
}

impl Variables {
    /// First value bound to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tuples
            .iter()
            .find(|var| var.varname == key)
            .map(|var| var.value.as_str())
    }

    /// Every value bound to `key`, in match order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.tuples
            .iter()
            .filter(|var| var.varname == key)
            .map(|var| var.value.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchVariable> {
        self.tuples.iter()
    }
}

/// Panics when the variable is unbound; use [`Variables::get`] otherwise.
impl Index<&str> for Variables {
    type Output = str;

    fn index(&self, key: &str) -> &str {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no binding for variable `{}`", key),
        }
    }
}

impl IntoIterator for Variables {
    type Item = MatchVariable;
    type IntoIter = std::vec::IntoIter<MatchVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = &'a MatchVariable;
    type IntoIter = std::slice::Iter<'a, MatchVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}
