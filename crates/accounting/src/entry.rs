use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockval_core::{AccountId, CompanyId, DomainError, DomainResult, EntryId, ProductId};

use crate::analytic::AnalyticDistribution;
use crate::journal::Journal;

/// One row of a journal entry (immutable once posted).
///
/// Exactly one of `debit` / `credit` is positive; the other is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    pub label: String,
    pub account: AccountId,
    pub debit: Decimal,
    pub credit: Decimal,
    pub product: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytic_distribution: Option<AnalyticDistribution>,
}

impl JournalEntryLine {
    pub fn debit(label: impl Into<String>, account: AccountId, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            account,
            debit: amount,
            credit: Decimal::ZERO,
            product: None,
            analytic_distribution: None,
        }
    }

    pub fn credit(label: impl Into<String>, account: AccountId, amount: Decimal) -> Self {
        Self {
            label: label.into(),
            account,
            debit: Decimal::ZERO,
            credit: amount,
            product: None,
            analytic_distribution: None,
        }
    }

    pub fn for_product(mut self, product: ProductId) -> Self {
        self.product = Some(product);
        self
    }

    /// Attach an analytic distribution. Empty distributions are not carried.
    pub fn with_analytic_distribution(mut self, distribution: &AnalyticDistribution) -> Self {
        if !distribution.is_empty() {
            self.analytic_distribution = Some(distribution.clone());
        }
        self
    }

    pub fn is_debit(&self) -> bool {
        self.debit > Decimal::ZERO
    }

    /// Positive amount on whichever side this line sits.
    pub fn amount(&self) -> Decimal {
        self.debit + self.credit
    }
}

/// An accounting entry ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryDraft {
    pub journal: Journal,
    pub company: CompanyId,
    pub date: NaiveDate,
    pub reference: String,
    pub lines: Vec<JournalEntryLine>,
}

impl JournalEntryDraft {
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Double-entry rules: non-empty, one positive side per line, balanced.
    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("journal entry must have lines"));
        }
        if self.journal.company != self.company {
            return Err(DomainError::invariant("journal belongs to another company"));
        }

        for line in &self.lines {
            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                return Err(DomainError::validation("amounts cannot be negative"));
            }
            let debit_side = line.debit > Decimal::ZERO;
            let credit_side = line.credit > Decimal::ZERO;
            if debit_side == credit_side {
                return Err(DomainError::validation(format!(
                    "line '{}' must carry exactly one positive side",
                    line.label
                )));
            }
        }

        if self.total_debit() != self.total_credit() {
            return Err(DomainError::invariant("debits must equal credits"));
        }

        Ok(())
    }
}

/// Reference to a posted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRef {
    pub id: EntryId,
    pub name: String,
}

impl core::fmt::Display for EntryRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
