//! Validation through a grammar
//!
//! Validation runs on accept, not per keystroke, so it uses the exact
//! match: the input must be one complete, unambiguous grammar string.
//! Per-variable validators then check the bound values, and their errors
//! are re-anchored at the variable's position in the outer input.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::document::Document;
use crate::grammar::CompiledGrammar;

/// A rejected input, with the cursor position (in characters) where the
/// problem is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub cursor_position: usize,
    pub message: String,
}

impl ValidationError {
    pub fn new(cursor_position: usize, message: impl Into<String>) -> ValidationError {
        ValidationError {
            cursor_position,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid input at position {}: {}",
            self.cursor_position, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Anything that can accept or reject a document.
pub trait Validator {
    fn validate(&self, document: &Document) -> Result<(), ValidationError>;
}

/// Validator dispatching on grammar variables.
pub struct GrammarValidator {
    grammar: Arc<CompiledGrammar>,
    validators: HashMap<String, Box<dyn Validator>>,
}

impl GrammarValidator {
    pub fn new(
        grammar: Arc<CompiledGrammar>,
        validators: HashMap<String, Box<dyn Validator>>,
    ) -> GrammarValidator {
        GrammarValidator {
            grammar,
            validators,
        }
    }
}

impl Validator for GrammarValidator {
    fn validate(&self, document: &Document) -> Result<(), ValidationError> {
        let matched = self.grammar.match_exact(document.text()).ok_or_else(|| {
            ValidationError::new(document.text().chars().count(), "invalid input")
        })?;

        for variable in matched.variables() {
            if let Some(validator) = self.validators.get(&variable.varname) {
                let inner = Document::at_end(variable.value.clone());
                if let Err(err) = validator.validate(&inner) {
                    // Re-anchor at the variable's place in the full input.
                    return Err(ValidationError::new(
                        variable.start + err.cursor_position,
                        err.message,
                    ));
                }
            }
        }

        Ok(())
    }
}
