//! An in-memory directory. Entries are held in the order they were added, and are never
//! changed once visible to a search except to maintain `numSubordinates` on a parent when
//! a child is added.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use ldap3_proto::proto::{LdapFilter, LdapSearchScope};
use uuid::Uuid;

use super::{AciSource, CandidateIter, EntrySource};
use crate::entry::{Entry, EntryScope};
use crate::filter::entry_match;
use crate::ldif;
use crate::prelude::*;
use crate::server::access::{parse_aci, AciRule};
use crate::time::generalized_time;
use crate::uniqueid;
use crate::utils::{is_descendant, normalise_dn, parent_ndn};

#[derive(Debug, Clone)]
struct IdEntry {
    id: u64,
    parent: Option<u64>,
    entry: Arc<Entry>,
}

#[derive(Debug)]
pub struct MemoryBackend {
    root_dse: Option<Arc<Entry>>,
    entries: BTreeMap<u64, IdEntry>,
    dn_index: HashMap<String, u64>,
    acis: HashMap<String, Vec<Arc<AciRule>>>,
    next_id: u64,
    namespace: Uuid,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend {
            root_dse: None,
            entries: BTreeMap::new(),
            dn_index: HashMap::new(),
            acis: HashMap::new(),
            next_id: 1,
            namespace: uniqueid::generate(),
        }
    }

    /// Add an entry, filling in the operational attributes the server maintains if they
    /// are not already present. Returns the entry id assigned.
    pub fn add(
        &mut self,
        mut entry: Entry,
        creator_dn: &str,
        ct: Duration,
    ) -> Result<u64, OperationError> {
        let ndn = entry.get_ndn().to_string();

        if self.dn_index.contains_key(&ndn) || (ndn.is_empty() && self.root_dse.is_some()) {
            admin_error!(dn = %entry.get_dn(), "entry already exists");
            return Err(OperationError::InvalidEntryState(format!(
                "entry already exists: {}",
                entry.get_dn()
            )));
        }

        let creator_ndn = normalise_dn(creator_dn)?;
        let id = self.next_id;
        let parent = parent_ndn(&ndn).and_then(|p| self.dn_index.get(p).copied());

        if !ndn.is_empty() {
            self.check_placement(&entry, parent)?;
        }

        if entry.scope() != EntryScope::Config {
            let timestamp = generalized_time(ct)?;
            let name = format!("{ndn}#{id}");
            let nsuniqueid = uniqueid::generate_from_name(Some(&self.namespace), name.as_bytes())?;

            Self::set_if_absent(&mut entry, Attribute::NsUniqueId, &uniqueid::format(&nsuniqueid));
            Self::set_if_absent(&mut entry, Attribute::CreateTimestamp, &timestamp);
            Self::set_if_absent(&mut entry, Attribute::ModifyTimestamp, &timestamp);
            Self::set_if_absent(&mut entry, Attribute::CreatorsName, &creator_ndn);
            Self::set_if_absent(&mut entry, Attribute::ModifiersName, &creator_ndn);
        }

        if entry.scope() == EntryScope::Entry {
            Self::set_if_absent(&mut entry, Attribute::EntryDn, &ndn);
            Self::set_if_absent(&mut entry, Attribute::EntryId, &id.to_string());
            if let Some(pid) = parent {
                Self::set_if_absent(&mut entry, Attribute::ParentId, &pid.to_string());
            }
        }

        let rules = Self::parse_entry_acis(&entry);
        if !rules.is_empty() {
            self.acis.insert(ndn.clone(), rules);
        }

        if ndn.is_empty() {
            self.root_dse = Some(Arc::new(entry));
            trace!("added root dse");
            return Ok(0);
        }

        if let Some(pid) = parent {
            self.bump_subordinates(pid);
        }

        trace!(%id, dn = %entry.get_dn(), "added entry");
        self.next_id += 1;
        self.dn_index.insert(ndn, id);
        self.entries.insert(
            id,
            IdEntry {
                id,
                parent,
                entry: Arc::new(entry),
            },
        );
        Ok(id)
    }

    /// Parse LDIF content and add every record in order. Returns the number of entries added.
    pub fn load_ldif(
        &mut self,
        content: &str,
        creator_dn: &str,
        ct: Duration,
    ) -> Result<usize, OperationError> {
        let entries = ldif::parse_str(content)?;
        let count = entries.len();
        for e in entries {
            self.add(e, creator_dn, ct)?;
        }
        admin_info!(%count, "loaded ldif");
        Ok(count)
    }

    /// Look up an entry by DN.
    pub fn get(&self, dn: &str) -> Option<Arc<Entry>> {
        let ndn = normalise_dn(dn).ok()?;
        if ndn.is_empty() {
            return self.root_dse.clone();
        }
        self.dn_index
            .get(&ndn)
            .and_then(|id| self.entries.get(id))
            .map(|ie| ie.entry.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len() + usize::from(self.root_dse.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An entry must be added below its parent. An entry whose parent does not exist is a
    /// new naming context, so no other entry may exist above or below it yet.
    fn check_placement(&self, entry: &Entry, parent: Option<u64>) -> Result<(), OperationError> {
        let ndn = entry.get_ndn();
        let reject = |msg: &str| {
            admin_error!(dn = %entry.get_dn(), "{}", msg);
            Err(OperationError::InvalidEntryState(format!(
                "{msg}: {}",
                entry.get_dn()
            )))
        };

        if parent.is_none() {
            let mut ancestor = parent_ndn(ndn);
            while let Some(a) = ancestor {
                if self.dn_index.contains_key(a) {
                    return reject("parent entry does not exist");
                }
                ancestor = parent_ndn(a);
            }
        }

        if self.dn_index.keys().any(|k| is_descendant(k, ndn)) {
            return reject("entries already exist below this entry");
        }
        Ok(())
    }

    fn set_if_absent(entry: &mut Entry, attr: Attribute, value: &str) {
        if !entry.attribute_pres(attr.as_str()) {
            entry.set_ava(attr.as_str(), [value]);
        }
    }

    fn bump_subordinates(&mut self, pid: u64) {
        if let Some(parent) = self.entries.get_mut(&pid) {
            let e = Arc::make_mut(&mut parent.entry);
            let count = e
                .get_ava_single(Attribute::NumSubordinates.as_ref())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);
            e.set_ava(Attribute::NumSubordinates.as_ref(), [(count + 1).to_string()]);
        }
    }

    fn parse_entry_acis(entry: &Entry) -> Vec<Arc<AciRule>> {
        entry
            .get_ava(Attribute::Aci.as_ref())
            .unwrap_or_default()
            .iter()
            .filter_map(|v| match parse_aci(v) {
                Ok(rules) => Some(rules),
                Err(e) => {
                    admin_error!(dn = %entry.get_dn(), ?e, "ignoring invalid aci");
                    None
                }
            })
            .flatten()
            .map(Arc::new)
            .collect()
    }

    fn in_scope(&self, ie: &IdEntry, base: Option<&IdEntry>, scope: &LdapSearchScope) -> bool {
        match (base, scope) {
            // Searches from the root DSE.
            (None, LdapSearchScope::OneLevel) => ie.parent.is_none(),
            (None, _) => true,
            (Some(b), LdapSearchScope::Base) => ie.id == b.id,
            (Some(b), LdapSearchScope::OneLevel) => ie.parent == Some(b.id),
            (Some(b), LdapSearchScope::Subtree) => {
                ie.id == b.id || is_descendant(ie.entry.get_ndn(), b.entry.get_ndn())
            }
            (Some(b), LdapSearchScope::Children) => {
                is_descendant(ie.entry.get_ndn(), b.entry.get_ndn())
            }
        }
    }
}

impl EntrySource for MemoryBackend {
    #[instrument(level = "debug", name = "be::fetch_candidates", skip_all)]
    fn fetch_candidates(
        &self,
        base: &str,
        scope: &LdapSearchScope,
        filter: &LdapFilter,
    ) -> Result<CandidateIter<'_>, OperationError> {
        let base_ndn = normalise_dn(base)?;
        let filter = filter.clone();

        if base_ndn.is_empty() && *scope == LdapSearchScope::Base {
            trace!("root dse search");
            let root = self
                .root_dse
                .clone()
                .filter(|e| entry_match(e, &filter))
                .map(Ok::<_, OperationError>);
            return Ok(Box::new(root.into_iter()));
        }

        let base_entry = if base_ndn.is_empty() {
            None
        } else {
            let ie = self
                .dn_index
                .get(&base_ndn)
                .and_then(|id| self.entries.get(id))
                .ok_or_else(|| {
                    request_warn!(?base, "search base does not exist");
                    OperationError::NoMatchingEntries
                })?;
            Some(ie)
        };

        let scope = scope.clone();
        let iter = self
            .entries
            .values()
            .filter(move |ie| self.in_scope(ie, base_entry, &scope))
            .filter(move |ie| entry_match(&ie.entry, &filter))
            .map(|ie| Ok::<_, OperationError>(ie.entry.clone()));
        Ok(Box::new(iter))
    }
}

impl AciSource for MemoryBackend {
    fn applicable_rules(&self, ndn: &str) -> Result<Vec<Arc<AciRule>>, OperationError> {
        let mut rules: Vec<Arc<AciRule>> = Vec::new();
        let mut current = Some(ndn);
        while let Some(dn) = current {
            if let Some(r) = self.acis.get(dn) {
                rules.extend(r.iter().cloned());
            }
            // The root DSE is not an ancestor of the entries below it.
            current = if dn.is_empty() { None } else { parent_ndn(dn) };
        }
        trace!(?ndn, count = rules.len(), "applicable rules");
        Ok(rules)
    }
}
