use stockval_core::DomainResult;

use crate::entry::{EntryRef, JournalEntryDraft};

/// Creates a journal entry from a draft and posts it immediately.
///
/// Implementations reject unbalanced drafts; no unposted entry survives a
/// failed call.
pub trait JournalEntryPoster: Send + Sync {
    fn post(&self, draft: JournalEntryDraft) -> DomainResult<EntryRef>;
}
