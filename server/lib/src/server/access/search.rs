use crate::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::profiles::{AciEffect, AciRule};
use super::AccessResult;
use crate::server::identity::{IdentType, Identity};

/// The outcome for a single attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrDecision<'a> {
    Denied(&'a str),
    Allowed(&'a str),
    Default(ReadPolicy),
}

fn decide_attr<'a>(
    ident: &Identity,
    entry_ndn: &str,
    attr: &str,
    rules: &'a [Arc<AciRule>],
    default_policy: ReadPolicy,
) -> AttrDecision<'a> {
    let mut allowed_by = None;
    for rule in rules
        .iter()
        .filter(|r| r.applies_to_read(ident, entry_ndn, attr))
    {
        match rule.effect {
            // A deny always wins, so there is nothing more to check.
            AciEffect::Deny => return AttrDecision::Denied(rule.name.as_str()),
            AciEffect::Allow => {
                if allowed_by.is_none() {
                    allowed_by = Some(rule.name.as_str());
                }
            }
        }
    }
    match allowed_by {
        Some(name) => AttrDecision::Allowed(name),
        None => AttrDecision::Default(default_policy),
    }
}

pub(super) fn search_filter_entry_attributes(
    ident: &Identity,
    entry_ndn: &str,
    candidates: &BTreeSet<AttrString>,
    rules: &[Arc<AciRule>],
    default_policy: ReadPolicy,
) -> AccessResult {
    // If this is an internal search, return our working set.
    match &ident.origin {
        IdentType::Internal => {
            security_info!(entry = %entry_ndn, "Internal identity, bypassing access check");
            return AccessResult::Grant;
        }
        IdentType::Anonymous | IdentType::User(_) => {}
    };

    let allowed: BTreeSet<AttrString> = candidates
        .iter()
        .filter(|attr| {
            match decide_attr(ident, entry_ndn, attr.as_str(), rules, default_policy) {
                AttrDecision::Denied(acl) => {
                    security_access!(
                        event = %ident, entry = %entry_ndn, %attr, %acl,
                        "denied ❌ - attribute excluded by aci"
                    );
                    false
                }
                AttrDecision::Allowed(acl) => {
                    trace!(entry = %entry_ndn, %attr, %acl, "allowed by aci");
                    true
                }
                AttrDecision::Default(ReadPolicy::Allow) => {
                    trace!(entry = %entry_ndn, %attr, "allowed by default read policy");
                    true
                }
                AttrDecision::Default(ReadPolicy::Deny) => {
                    security_access!(
                        event = %ident, entry = %entry_ndn, %attr,
                        "denied ❌ - no aci grants read and default read policy is deny"
                    );
                    false
                }
            }
        })
        .cloned()
        .collect();

    AccessResult::Allow(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::access::profiles::{AciSubject, AciTarget};

    const USER_DN: &str = "uid=all_attrs_test,ou=people,dc=example,dc=com";

    fn attrs(s: &str) -> BTreeSet<AttrString> {
        s.split_whitespace().map(AttrString::from).collect()
    }

    #[test]
    fn test_access_deny_overrides_allow() {
        sketching::test_init();
        let user = Identity::from_dn(USER_DN).unwrap();
        let rules = vec![
            Arc::new(AciRule::from_raw(
                "allow everything",
                AciEffect::Allow,
                "*",
                AciSubject::Anyone,
            )),
            Arc::new(AciRule::from_raw(
                "deny modifiersname",
                AciEffect::Deny,
                "modifiersname",
                AciSubject::Dn(USER_DN.to_string()),
            )),
        ];
        let candidates = attrs("creatorsname modifiersname objectclass");

        for policy in [ReadPolicy::Allow, ReadPolicy::Deny] {
            let r = search_filter_entry_attributes(&user, USER_DN, &candidates, &rules, policy);
            assert_eq!(r, AccessResult::Allow(attrs("creatorsname objectclass")));
        }

        // The deny names a different user, so it does not apply.
        let other = Identity::from_dn("uid=other,dc=example,dc=com").unwrap();
        let r =
            search_filter_entry_attributes(&other, USER_DN, &candidates, &rules, ReadPolicy::Deny);
        assert_eq!(r, AccessResult::Allow(candidates.clone()));
    }

    #[test]
    fn test_access_default_policy() {
        sketching::test_init();
        let anon = Identity::anonymous();
        let mut rule = AciRule::from_raw(
            "allow cn",
            AciEffect::Allow,
            "cn",
            AciSubject::Anyone,
        );
        rule.target = AciTarget::Attrs(attrs("cn"));
        let rules = vec![Arc::new(rule)];
        let candidates = attrs("cn sn");

        let r =
            search_filter_entry_attributes(&anon, USER_DN, &candidates, &rules, ReadPolicy::Allow);
        assert_eq!(r, AccessResult::Allow(attrs("cn sn")));

        let r =
            search_filter_entry_attributes(&anon, USER_DN, &candidates, &rules, ReadPolicy::Deny);
        assert_eq!(r, AccessResult::Allow(attrs("cn")));

        let r = search_filter_entry_attributes(&anon, USER_DN, &candidates, &[], ReadPolicy::Deny);
        assert_eq!(r, AccessResult::Allow(BTreeSet::new()));
    }

    #[test]
    fn test_access_internal_bypass() {
        sketching::test_init();
        let rules = vec![Arc::new(AciRule::from_raw(
            "deny all",
            AciEffect::Deny,
            "*",
            AciSubject::Anyone,
        ))];
        let r = search_filter_entry_attributes(
            &Identity::from_internal(),
            USER_DN,
            &attrs("cn"),
            &rules,
            ReadPolicy::Deny,
        );
        assert_eq!(r, AccessResult::Grant);
    }
}
