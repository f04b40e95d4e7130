//! The backend interfaces the search core reads through. Storage, filter matching, and
//! the lookup of access rules all live behind these traits so that the core never owns or
//! mutates directory data.
//!
//! [`MemoryBackend`] is a complete in-memory implementation of every interface.

use std::sync::Arc;

use ldap3_proto::proto::{LdapFilter, LdapSearchScope};

use crate::entry::{Entry, EntryScope};
use crate::prelude::*;
use crate::server::access::AciRule;

pub mod memory;

pub use self::memory::MemoryBackend;

/// A lazy sequence of candidate entries. An `Err` item means the source failed part way
/// through and nothing more will be produced.
pub type CandidateIter<'a> =
    Box<dyn Iterator<Item = Result<Arc<Entry>, OperationError>> + Send + 'a>;

/// Provides the entries that match a filter within a search scope.
pub trait EntrySource: Send + Sync {
    /// The entries under `base` within `scope` that match `filter`. Fails with
    /// [`OperationError::NoMatchingEntries`] if the base entry does not exist.
    fn fetch_candidates(
        &self,
        base: &str,
        scope: &LdapSearchScope,
        filter: &LdapFilter,
    ) -> Result<CandidateIter<'_>, OperationError>;
}

/// Provides the access rules that apply to an entry.
pub trait AciSource: Send + Sync {
    /// The rules that apply to the entry with this normalised DN.
    fn applicable_rules(&self, ndn: &str) -> Result<Vec<Arc<AciRule>>, OperationError>;
}

/// Provides the read decision used when no access rule applies to an attribute.
pub trait ReadPolicySource: Send + Sync {
    fn default_read_policy(&self, scope: EntryScope) -> ReadPolicy;
}

impl ReadPolicySource for ReadPolicy {
    fn default_read_policy(&self, _scope: EntryScope) -> ReadPolicy {
        *self
    }
}
