use std::collections::BTreeSet;

use crate::prelude::*;
use crate::server::identity::{IdentType, Identity};

// =========================================================================
// ACI RULE MODEL
// =========================================================================

/// Does a rule grant or withhold the rights it names?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AciEffect {
    Allow,
    Deny,
}

bitflags::bitflags! {
    /// The rights an ACI names.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AciRights: u32 {
        const READ = 0b0000_0001;
        const SEARCH = 0b0000_0010;
        const COMPARE = 0b0000_0100;
        const WRITE = 0b0000_1000;
        const SELFWRITE = 0b0001_0000;
        const ADD = 0b0010_0000;
        const DELETE = 0b0100_0000;
        const PROXY = 0b1000_0000;
        /// Everything except proxy.
        const ALL = Self::READ.bits()
            | Self::SEARCH.bits()
            | Self::COMPARE.bits()
            | Self::WRITE.bits()
            | Self::SELFWRITE.bits()
            | Self::ADD.bits()
            | Self::DELETE.bits();
    }
}

impl AciRights {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw.to_lowercase().as_str() {
            "read" => Some(AciRights::READ),
            "search" => Some(AciRights::SEARCH),
            "compare" => Some(AciRights::COMPARE),
            "write" => Some(AciRights::WRITE),
            "selfwrite" => Some(AciRights::SELFWRITE),
            "add" => Some(AciRights::ADD),
            "delete" => Some(AciRights::DELETE),
            "proxy" => Some(AciRights::PROXY),
            "all" => Some(AciRights::ALL),
            _ => None,
        }
    }
}

/// The attributes a rule covers. Names are held lower cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AciTarget {
    All,
    Attrs(BTreeSet<AttrString>),
    /// Every attribute except these.
    AllExcept(BTreeSet<AttrString>),
}

impl AciTarget {
    pub fn covers(&self, attr: &str) -> bool {
        match self {
            AciTarget::All => true,
            AciTarget::Attrs(attrs) => attrs.contains(attr),
            AciTarget::AllExcept(attrs) => !attrs.contains(attr),
        }
    }
}

/// Who a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AciSubject {
    /// Everyone, bound or not.
    Anyone,
    /// Any bound user.
    AllAuthenticated,
    Anonymous,
    /// A bound user reading their own entry.
    SelfEntry,
    /// A bound user with this normalised DN.
    Dn(String),
    AnyOf(Vec<AciSubject>),
    Not(Box<AciSubject>),
}

impl AciSubject {
    /// Does this subject match the requester, when reading the entry named by `entry_ndn`?
    pub fn matches(&self, ident: &Identity, entry_ndn: &str) -> bool {
        match self {
            AciSubject::Anyone => true,
            AciSubject::AllAuthenticated => matches!(ident.origin, IdentType::User(_)),
            AciSubject::Anonymous => ident.is_anonymous(),
            AciSubject::SelfEntry => ident.get_ndn() == Some(entry_ndn),
            AciSubject::Dn(ndn) => ident.get_ndn() == Some(ndn.as_str()),
            AciSubject::AnyOf(subjects) => subjects.iter().any(|s| s.matches(ident, entry_ndn)),
            AciSubject::Not(s) => !s.matches(ident, entry_ndn),
        }
    }
}

/// A single access rule, as parsed from one `allow` or `deny` clause of an ACI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AciRule {
    pub name: String,
    pub effect: AciEffect,
    pub rights: AciRights,
    pub target: AciTarget,
    pub subject: AciSubject,
}

impl AciRule {
    /// Does this rule decide read access to `attr` for the requester on this entry?
    pub fn applies_to_read(&self, ident: &Identity, entry_ndn: &str, attr: &str) -> bool {
        self.rights.contains(AciRights::READ)
            && self.target.covers(attr)
            && self.subject.matches(ident, entry_ndn)
    }

    /// ⚠️  - Manually create a rule from values.
    /// This is a TEST ONLY method and will never be exposed in production.
    #[cfg(test)]
    pub(crate) fn from_raw(
        name: &str,
        effect: AciEffect,
        attrs: &str,
        subject: AciSubject,
    ) -> Self {
        let target = if attrs == "*" {
            AciTarget::All
        } else {
            AciTarget::Attrs(attrs.split_whitespace().map(AttrString::from).collect())
        };
        AciRule {
            name: name.to_string(),
            effect,
            rights: AciRights::READ | AciRights::SEARCH | AciRights::COMPARE,
            target,
            subject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_DN: &str = "uid=all_attrs_test,ou=people,dc=example,dc=com";

    #[test]
    fn test_aci_subject_matches() {
        let user = Identity::from_dn(USER_DN).unwrap();
        let other = Identity::from_dn("uid=other,ou=people,dc=example,dc=com").unwrap();
        let anon = Identity::anonymous();

        assert!(AciSubject::Anyone.matches(&anon, USER_DN));
        assert!(AciSubject::AllAuthenticated.matches(&user, USER_DN));
        assert!(!AciSubject::AllAuthenticated.matches(&anon, USER_DN));
        assert!(AciSubject::Anonymous.matches(&anon, USER_DN));
        assert!(AciSubject::SelfEntry.matches(&user, USER_DN));
        assert!(!AciSubject::SelfEntry.matches(&other, USER_DN));

        let dn = AciSubject::Dn(USER_DN.to_string());
        assert!(dn.matches(&user, "dc=example,dc=com"));
        assert!(!dn.matches(&other, "dc=example,dc=com"));

        let not_dn = AciSubject::Not(Box::new(dn.clone()));
        assert!(!not_dn.matches(&user, "dc=example,dc=com"));
        assert!(not_dn.matches(&anon, "dc=example,dc=com"));

        let any = AciSubject::AnyOf(vec![dn, AciSubject::Anonymous]);
        assert!(any.matches(&anon, USER_DN));
        assert!(!any.matches(&other, USER_DN));
    }

    #[test]
    fn test_aci_rule_applies_to_read() {
        let user = Identity::from_dn(USER_DN).unwrap();
        let mut rule = AciRule::from_raw(
            "deny modifiersname",
            AciEffect::Deny,
            "modifiersname",
            AciSubject::Dn(USER_DN.to_string()),
        );
        assert!(rule.applies_to_read(&user, USER_DN, "modifiersname"));
        assert!(!rule.applies_to_read(&user, USER_DN, "creatorsname"));

        rule.rights = AciRights::WRITE;
        assert!(!rule.applies_to_read(&user, USER_DN, "modifiersname"));

        rule.rights = AciRights::ALL;
        rule.target = AciTarget::AllExcept(["userpassword".into()].into_iter().collect());
        assert!(rule.applies_to_read(&user, USER_DN, "modifiersname"));
        assert!(!rule.applies_to_read(&user, USER_DN, "userpassword"));
    }

    #[test]
    fn test_aci_rights_keywords() {
        assert_eq!(AciRights::from_keyword("READ"), Some(AciRights::READ));
        assert!(AciRights::from_keyword("all")
            .map(|r| r.contains(AciRights::READ) && !r.contains(AciRights::PROXY))
            .unwrap_or(false));
        assert_eq!(AciRights::from_keyword("destroy"), None);
    }
}
