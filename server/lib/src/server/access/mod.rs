//! Access control for search results.
//!
//! Rules are held as `aci` attribute values on entries. Each value is parsed into one or
//! more [`AciRule`]s by [`parse_aci`]. When an entry is returned from a search, the rules
//! that apply to it are used to decide, for each attribute independently, if the requester
//! may read it:
//!
//! * If any rule that denies read matches the requester and the attribute, it is removed.
//! * Otherwise if any rule that allows read matches, it is kept.
//! * Otherwise the configured default read policy decides.
//!
//! The internal identity (which the root DN binds as) is never subject to access control.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::entry::Entry;
use crate::prelude::*;
use crate::server::identity::Identity;

pub mod aci;
pub mod profiles;
mod search;

pub use self::aci::parse_aci;
pub use self::profiles::{AciEffect, AciRights, AciRule, AciSubject, AciTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AccessResult {
    /// Access control does not apply, everything is visible.
    Grant,
    /// Only these attributes are visible.
    Allow(BTreeSet<AttrString>),
}

/// Reduce a set of candidate attributes to those `ident` may read on this entry.
#[instrument(level = "debug", name = "access::filter_entry_attributes", skip_all)]
pub fn filter_entry_attributes(
    ident: &Identity,
    entry: &Entry,
    candidates: &BTreeSet<AttrString>,
    rules: &[Arc<AciRule>],
    default_policy: ReadPolicy,
) -> BTreeSet<AttrString> {
    match search::search_filter_entry_attributes(
        ident,
        entry.get_ndn(),
        candidates,
        rules,
        default_policy,
    ) {
        AccessResult::Grant => candidates.clone(),
        AccessResult::Allow(allowed) => {
            debug_assert!(allowed.is_subset(candidates));
            allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENY_MODIFIERSNAME: &str = r#"(targetattr= "modifiersName")(version 3.0; acl "Deny modifiersName for user"; deny (read) userdn = "ldap:///uid=all_attrs_test,ou=people,dc=example,dc=com";)"#;

    fn attrs(s: &str) -> BTreeSet<AttrString> {
        s.split_whitespace().map(AttrString::from).collect()
    }

    #[test]
    fn test_filter_entry_attributes_parsed_rule() {
        sketching::test_init();
        let rules: Vec<Arc<AciRule>> = parse_aci(DENY_MODIFIERSNAME)
            .unwrap()
            .into_iter()
            .map(Arc::new)
            .collect();

        let entry = Entry::new("dc=example,dc=com").unwrap();
        let candidates = attrs("createtimestamp creatorsname modifiersname modifytimestamp");

        let user = Identity::from_dn("uid=all_attrs_test,ou=people,dc=example,dc=com").unwrap();
        let allowed =
            filter_entry_attributes(&user, &entry, &candidates, &rules, ReadPolicy::Allow);
        assert_eq!(
            allowed,
            attrs("createtimestamp creatorsname modifytimestamp")
        );

        let allowed = filter_entry_attributes(
            &Identity::from_internal(),
            &entry,
            &candidates,
            &rules,
            ReadPolicy::Deny,
        );
        assert_eq!(allowed, candidates);
    }

    #[test]
    fn test_filter_entry_attributes_idempotent() {
        sketching::test_init();
        let rules: Vec<Arc<AciRule>> = parse_aci(DENY_MODIFIERSNAME)
            .unwrap()
            .into_iter()
            .map(Arc::new)
            .collect();
        let entry = Entry::new("ou=people,dc=example,dc=com").unwrap();
        let user = Identity::from_dn("uid=all_attrs_test,ou=people,dc=example,dc=com").unwrap();
        let candidates = attrs("aci modifiersname numsubordinates");

        let once = filter_entry_attributes(&user, &entry, &candidates, &rules, ReadPolicy::Allow);
        let twice = filter_entry_attributes(&user, &entry, &once, &rules, ReadPolicy::Allow);
        assert_eq!(once, twice);
        assert!(once.is_subset(&candidates));
    }
}
