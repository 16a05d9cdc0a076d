use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use stockval_core::{DomainError, DomainResult};
use stockval_inventory::{REVALUATION_SEQUENCE, SequenceGenerator};

use crate::config::SequenceSettings;

#[derive(Debug, Clone)]
struct Sequence {
    prefix: String,
    padding: usize,
    next: u64,
}

/// Prefix + zero-padded counter sequences, e.g. `REV/00001`.
#[derive(Debug, Default)]
pub struct InMemorySequenceGenerator {
    sequences: Mutex<HashMap<String, Sequence>>,
}

impl InMemorySequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with the revaluation sequence defined.
    pub fn from_settings(settings: &SequenceSettings) -> Self {
        let generator = Self::new();
        generator.define(REVALUATION_SEQUENCE, settings.revaluation_prefix.clone(), settings.padding);
        generator
    }

    /// Define (or reset) the sequence for `code`.
    pub fn define(&self, code: impl Into<String>, prefix: impl Into<String>, padding: usize) {
        self.sequences.lock().unwrap_or_else(PoisonError::into_inner).insert(
            code.into(),
            Sequence {
                prefix: prefix.into(),
                padding,
                next: 1,
            },
        );
    }
}

impl SequenceGenerator for InMemorySequenceGenerator {
    fn next_by_code(&self, code: &str) -> DomainResult<Option<String>> {
        let mut sequences = self
            .sequences
            .lock()
            .map_err(|_| DomainError::invariant("sequence lock poisoned"))?;
        let Some(seq) = sequences.get_mut(code) else {
            return Ok(None);
        };
        let value = format!("{}{:0width$}", seq.prefix, seq.next, width = seq.padding);
        seq.next += 1;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_increments() {
        let generator = InMemorySequenceGenerator::from_settings(&SequenceSettings::default());
        assert_eq!(generator.next_by_code(REVALUATION_SEQUENCE).unwrap().as_deref(), Some("REV/00001"));
        assert_eq!(generator.next_by_code(REVALUATION_SEQUENCE).unwrap().as_deref(), Some("REV/00002"));
    }

    #[test]
    fn unknown_code_yields_nothing() {
        let generator = InMemorySequenceGenerator::new();
        assert_eq!(generator.next_by_code(REVALUATION_SEQUENCE).unwrap(), None);
    }
}
