use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use stockval_core::{CompanyId, DomainError, DomainResult};
use stockval_inventory::{AuditLog, AuditSubject};

/// A note attached to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditNote {
    pub company: CompanyId,
    pub subject: AuditSubject,
    pub body: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    notes: RwLock<Vec<AuditNote>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes of `subject`, oldest first.
    pub fn notes_for(&self, subject: AuditSubject) -> Vec<String> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.subject == subject)
            .map(|n| n.body.clone())
            .collect()
    }
}

impl AuditLog for InMemoryAuditLog {
    fn note(&self, company: CompanyId, subject: AuditSubject, body: String) -> DomainResult<()> {
        let mut notes = self
            .notes
            .write()
            .map_err(|_| DomainError::invariant("audit log lock poisoned"))?;
        notes.push(AuditNote {
            company,
            subject,
            body,
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}
