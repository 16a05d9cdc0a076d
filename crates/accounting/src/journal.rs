//! Journals and stock-valuation journal resolution.

use serde::{Deserialize, Serialize};

use stockval_core::{CompanyId, DomainError, DomainResult, JournalId};

/// Journal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalKind {
    General,
    Sale,
    Purchase,
    Cash,
    Bank,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Journal {
    pub id: JournalId,
    pub company: CompanyId,
    /// Short code used as the prefix of entry names (e.g. "STJ").
    pub code: String,
    pub name: String,
    pub kind: JournalKind,
}

/// Company-level accounting configuration consulted for valuation entries.
pub trait ValuationConfig: Send + Sync {
    /// The stock-valuation journal explicitly configured on the company.
    fn stock_valuation_journal(&self, company: CompanyId) -> Option<Journal>;

    /// Every journal of the company, in lookup order.
    fn journals(&self, company: CompanyId) -> Vec<Journal>;
}

/// Configured stock journal, else the first general journal whose name
/// contains "valuation" (case-insensitive).
pub fn resolve_valuation_journal<C>(config: &C, company: CompanyId) -> Option<Journal>
where
    C: ValuationConfig + ?Sized,
{
    if let Some(journal) = config.stock_valuation_journal(company) {
        return Some(journal);
    }

    config.journals(company).into_iter().find(|j| {
        j.company == company
            && j.kind == JournalKind::General
            && j.name.to_lowercase().contains("valuation")
    })
}

/// Like [`resolve_valuation_journal`], but a missing journal is a hard error.
pub fn require_valuation_journal(journal: Option<&Journal>) -> DomainResult<&Journal> {
    journal.ok_or_else(|| {
        DomainError::precondition(
            "inventory valuation journal not found; configure it on the company",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StaticConfig {
        configured: Option<Journal>,
        journals: Vec<Journal>,
    }

    impl ValuationConfig for StaticConfig {
        fn stock_valuation_journal(&self, _company: CompanyId) -> Option<Journal> {
            self.configured.clone()
        }

        fn journals(&self, company: CompanyId) -> Vec<Journal> {
            self.journals.iter().filter(|j| j.company == company).cloned().collect()
        }
    }

    fn journal(company: CompanyId, name: &str, kind: JournalKind) -> Journal {
        Journal {
            id: JournalId::new(),
            company,
            code: "J".to_string(),
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn configured_journal_wins() {
        let company = CompanyId::new();
        let configured = journal(company, "Stock Journal", JournalKind::General);
        let config = StaticConfig {
            configured: Some(configured.clone()),
            journals: vec![journal(company, "Inventory Valuation", JournalKind::General)],
        };
        assert_eq!(resolve_valuation_journal(&config, company), Some(configured));
    }

    #[test]
    fn falls_back_to_general_journal_named_valuation() {
        let company = CompanyId::new();
        let wanted = journal(company, "Inventory VALUATION", JournalKind::General);
        let config = StaticConfig {
            configured: None,
            journals: vec![
                journal(company, "Valuation sales", JournalKind::Sale),
                journal(company, "Miscellaneous", JournalKind::General),
                wanted.clone(),
            ],
        };
        assert_eq!(resolve_valuation_journal(&config, company), Some(wanted));
    }

    #[test]
    fn other_company_journals_are_ignored() {
        let company = CompanyId::new();
        let config = StaticConfig {
            configured: None,
            journals: vec![journal(CompanyId::new(), "Inventory Valuation", JournalKind::General)],
        };
        assert_eq!(resolve_valuation_journal(&config, company), None);
        assert!(matches!(
            require_valuation_journal(None),
            Err(DomainError::Precondition(_))
        ));
    }
}
