use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use stockval_accounting::{Journal, ValuationConfig};
use stockval_core::{CompanyId, JournalId};

/// Journals and the stock-valuation journal configured per company.
#[derive(Debug, Default)]
pub struct InMemoryValuationConfig {
    journals: RwLock<Vec<Journal>>,
    stock_journal: RwLock<HashMap<CompanyId, JournalId>>,
}

impl InMemoryValuationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_journal(&self, journal: Journal) {
        self.journals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(journal);
    }

    /// Configure `journal` as the company's stock-valuation journal.
    pub fn set_stock_journal(&self, company: CompanyId, journal: JournalId) {
        self.stock_journal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(company, journal);
    }
}

impl ValuationConfig for InMemoryValuationConfig {
    fn stock_valuation_journal(&self, company: CompanyId) -> Option<Journal> {
        let id = *self
            .stock_journal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&company)?;
        self.journals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|j| j.id == id && j.company == company)
            .cloned()
    }

    fn journals(&self, company: CompanyId) -> Vec<Journal> {
        self.journals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|j| j.company == company)
            .cloned()
            .collect()
    }
}
