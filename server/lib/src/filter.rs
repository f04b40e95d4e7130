//! Evaluation of LDAP search filters against entries. Attribute names and values are both
//! compared ignoring case.

use ldap3_proto::proto::{LdapFilter, LdapSubstringFilter};

use crate::entry::Entry;
use crate::prelude::*;

/// Does this entry match the filter?
pub fn entry_match(entry: &Entry, filter: &LdapFilter) -> bool {
    let r = match filter {
        LdapFilter::And(l) => l.iter().all(|f| entry_match(entry, f)),
        LdapFilter::Or(l) => l.iter().any(|f| entry_match(entry, f)),
        LdapFilter::Not(f) => !entry_match(entry, f),
        LdapFilter::Equality(a, v) | LdapFilter::Approx(a, v) => entry.attribute_equality(a, v),
        LdapFilter::Present(a) => entry.attribute_pres(a),
        LdapFilter::Substring(a, sub) => entry
            .get_ava(a)
            .map(|vs| vs.iter().any(|v| substring_match(v, sub)))
            .unwrap_or(false),
        LdapFilter::GreaterOrEqual(a, v) => entry
            .get_ava(a)
            .map(|vs| vs.iter().any(|ev| ordering_match(ev, v).is_ge()))
            .unwrap_or(false),
        LdapFilter::LessOrEqual(a, v) => entry
            .get_ava(a)
            .map(|vs| vs.iter().any(|ev| ordering_match(ev, v).is_le()))
            .unwrap_or(false),
        #[allow(unreachable_patterns)]
        _ => {
            filter_warn!(?filter, "unsupported filter component, treating as no match");
            false
        }
    };
    filter_trace!(dn = %entry.get_dn(), ?filter, result = %r);
    r
}

/// Integers are compared numerically, anything else is compared as lower case text.
fn ordering_match(value: &str, assertion: &str) -> std::cmp::Ordering {
    match (value.parse::<i64>(), assertion.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => value.to_lowercase().cmp(&assertion.to_lowercase()),
    }
}

fn substring_match(value: &str, sub: &LdapSubstringFilter) -> bool {
    let value = value.to_lowercase();
    let mut rem = value.as_str();

    if let Some(initial) = &sub.initial {
        let initial = initial.to_lowercase();
        match rem.strip_prefix(initial.as_str()) {
            Some(r) => rem = r,
            None => return false,
        }
    }

    for any in sub.any.iter() {
        let any = any.to_lowercase();
        match rem.find(any.as_str()) {
            Some(idx) => rem = &rem[idx + any.len()..],
            None => return false,
        }
    }

    match &sub.final_ {
        Some(final_) => rem.ends_with(final_.to_lowercase().as_str()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entry() -> Entry {
        let mut e = Entry::new("uid=all_attrs_test,ou=people,dc=example,dc=com").unwrap();
        e.add_ava("objectClass", "top");
        e.add_ava("objectClass", "inetOrgPerson");
        e.add_ava("uid", "all_attrs_test");
        e.add_ava("cn", "All Attrs Test");
        e.add_ava("entryid", "4");
        e
    }

    fn sub(initial: Option<&str>, any: &[&str], final_: Option<&str>) -> LdapSubstringFilter {
        LdapSubstringFilter {
            initial: initial.map(str::to_string),
            any: any.iter().map(|s| s.to_string()).collect(),
            final_: final_.map(str::to_string),
        }
    }

    #[test]
    fn test_filter_eq_pres() {
        let e = test_entry();
        assert!(entry_match(&e, &LdapFilter::Present("OBJECTCLASS".to_string())));
        assert!(!entry_match(&e, &LdapFilter::Present("mail".to_string())));
        assert!(entry_match(
            &e,
            &LdapFilter::Equality("objectclass".to_string(), "INETORGPERSON".to_string())
        ));
        assert!(!entry_match(
            &e,
            &LdapFilter::Equality("uid".to_string(), "someone".to_string())
        ));
    }

    #[test]
    fn test_filter_and_or_not() {
        let e = test_entry();
        let is_person =
            LdapFilter::Equality("objectClass".to_string(), "inetorgperson".to_string());
        let has_mail = LdapFilter::Present("mail".to_string());

        assert!(entry_match(
            &e,
            &LdapFilter::Or(vec![has_mail.clone(), is_person.clone()])
        ));
        assert!(!entry_match(
            &e,
            &LdapFilter::And(vec![has_mail.clone(), is_person.clone()])
        ));
        assert!(entry_match(
            &e,
            &LdapFilter::And(vec![LdapFilter::Not(Box::new(has_mail)), is_person])
        ));
        // An empty and is true, an empty or is false.
        assert!(entry_match(&e, &LdapFilter::And(vec![])));
        assert!(!entry_match(&e, &LdapFilter::Or(vec![])));
    }

    #[test]
    fn test_filter_substring() {
        let e = test_entry();
        let f = |s| LdapFilter::Substring("cn".to_string(), s);
        assert!(entry_match(&e, &f(sub(Some("all"), &[], None))));
        assert!(entry_match(&e, &f(sub(None, &["attrs"], Some("TEST")))));
        assert!(entry_match(&e, &f(sub(Some("a"), &["l", "s"], Some("t")))));
        assert!(!entry_match(&e, &f(sub(Some("test"), &[], None))));
        assert!(!entry_match(&e, &f(sub(None, &["test", "attrs"], None))));
    }

    #[test]
    fn test_filter_ordering() {
        let e = test_entry();
        assert!(entry_match(
            &e,
            &LdapFilter::GreaterOrEqual("entryid".to_string(), "4".to_string())
        ));
        // Numeric, not lexical.
        assert!(!entry_match(
            &e,
            &LdapFilter::GreaterOrEqual("entryid".to_string(), "10".to_string())
        ));
        assert!(entry_match(
            &e,
            &LdapFilter::LessOrEqual("entryid".to_string(), "10".to_string())
        ));
        assert!(entry_match(
            &e,
            &LdapFilter::LessOrEqual("uid".to_string(), "b".to_string())
        ));
    }
}
