//! `server` contains the query server, which is the main high level construction to
//! coordinate searches. A search flows through four stages:
//!
//! * the request is parsed into a [`SearchEvent`], rejecting malformed requests before any
//!   entry is read,
//! * candidate entries are pulled one at a time from the [`EntrySource`],
//! * each entry has the requested attributes selected ([`select`]) and then reduced by
//!   access control ([`access`]),
//! * the reduced entry is yielded to the caller.
//!
//! Results are produced lazily by [`SearchResults`], so a caller that stops iterating
//! stops the search.

use std::collections::BTreeSet;
use std::sync::Arc;

use ldap3_proto::simple::SearchRequest;

use crate::be::{AciSource, CandidateIter, EntrySource, ReadPolicySource};
use crate::entry::{Entry, EntryReduced};
use crate::event::SearchEvent;
use crate::prelude::*;
use crate::schema::Schema;

pub mod access;
pub mod identity;
pub mod select;


use self::identity::Identity;
use self::select::RequestedAttrs;

#[derive(Clone)]
pub struct QueryServer {
    schema: Arc<Schema>,
    entries: Arc<dyn EntrySource>,
    acis: Arc<dyn AciSource>,
    policy: Arc<dyn ReadPolicySource>,
}

impl QueryServer {
    pub fn new(
        schema: Arc<Schema>,
        entries: Arc<dyn EntrySource>,
        acis: Arc<dyn AciSource>,
        policy: Arc<dyn ReadPolicySource>,
    ) -> Self {
        QueryServer {
            schema,
            entries,
            acis,
            policy,
        }
    }

    /// Begin a search from an LDAP request. A malformed request fails here, before any
    /// entry is read.
    #[instrument(level = "debug", name = "search", skip_all)]
    pub fn search(
        &self,
        sr: &SearchRequest,
        ident: &Identity,
    ) -> Result<SearchResults<'_>, OperationError> {
        let se = SearchEvent::from_ldap(sr, ident.clone(), &self.schema)?;
        self.search_ext(se)
    }

    /// Begin a search from an already parsed event.
    #[instrument(level = "debug", name = "search_ext", skip_all)]
    pub fn search_ext(&self, se: SearchEvent) -> Result<SearchResults<'_>, OperationError> {
        request_info!(
            event = %se.ident,
            base = %se.base,
            scope = ?se.scope,
            "search"
        );

        let candidates = self
            .entries
            .fetch_candidates(&se.base, &se.scope, &se.filter)
            .map_err(|e| {
                match e {
                    OperationError::NoMatchingEntries | OperationError::InvalidDn(_) => e,
                    _ => {
                        admin_error!(?e, "entry source failed to start the search");
                        OperationError::CollaboratorUnavailable(e.to_string())
                    }
                }
            })?;

        Ok(SearchResults {
            qs: self,
            candidates,
            ident: se.ident,
            attrs: se.attrs,
            warnings: se.warnings,
            done: false,
        })
    }

    /// Select and reduce the attributes of one entry for this requester.
    fn resolve_entry(
        &self,
        ident: &Identity,
        attrs: &RequestedAttrs,
        entry: &Entry,
    ) -> Result<EntryReduced, OperationError> {
        let selected = attrs.select(entry, &self.schema);

        let allowed = if selected.is_empty() {
            BTreeSet::new()
        } else {
            // The internal identity is granted everything, so there is no need to look
            // up the rules.
            let rules = if ident.is_internal() {
                Vec::new()
            } else {
                self.acis.applicable_rules(entry.get_ndn()).map_err(|e| {
                    admin_error!(?e, dn = %entry.get_dn(), "aci source failed");
                    OperationError::CollaboratorUnavailable(e.to_string())
                })?
            };
            let policy = self.policy.default_read_policy(entry.scope());
            access::filter_entry_attributes(ident, entry, &selected, &rules, policy)
        };

        trace!(dn = %entry.get_dn(), selected = ?selected, allowed = ?allowed);
        Ok(entry.reduce_attributes(&allowed, &self.schema))
    }
}

/// The results of a search. Each entry is read from the entry source, resolved and
/// yielded in turn. This can be iterated once. After an error nothing more is yielded,
/// and entries already yielded remain valid.
pub struct SearchResults<'a> {
    qs: &'a QueryServer,
    candidates: CandidateIter<'a>,
    ident: Identity,
    attrs: RequestedAttrs,
    warnings: Vec<OperationError>,
    done: bool,
}

impl SearchResults<'_> {
    /// Problems with the request that did not stop the search, such as an unknown
    /// attribute being requested.
    pub fn warnings(&self) -> &[OperationError] {
        &self.warnings
    }
}

impl Iterator for SearchResults<'_> {
    type Item = Result<EntryReduced, OperationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let r = match self.candidates.next()? {
            Ok(entry) => self.qs.resolve_entry(&self.ident, &self.attrs, &entry),
            Err(e) => {
                admin_error!(?e, "entry source failed during the search");
                Err(match e {
                    OperationError::CollaboratorUnavailable(_) => e,
                    e => OperationError::CollaboratorUnavailable(e.to_string()),
                })
            }
        };

        if r.is_err() {
            self.done = true;
        }
        Some(r)
    }
}
