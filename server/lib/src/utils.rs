//! Distinguished name helpers. All DN comparisons in the server are made on the
//! normalised form produced by [`normalise_dn`].

use crate::prelude::*;

/// Split a DN into its RDN components, honouring `\,` escapes. The components are
/// returned untrimmed.
fn split_rdns(dn: &str) -> Vec<&str> {
    let mut rdns = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, c) in dn.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => {
                rdns.push(&dn[start..idx]);
                start = idx + 1;
            }
            _ => escaped = false,
        }
    }
    rdns.push(&dn[start..]);
    rdns
}

/// Normalise a DN for comparison: each RDN has surrounding whitespace removed,
/// whitespace around `=` removed, and the whole value is lower cased. The root DSE
/// normalises to the empty string.
pub fn normalise_dn(dn: &str) -> Result<String, OperationError> {
    let dn = dn.trim();
    if dn.is_empty() {
        return Ok(String::new());
    }

    let rdns: Result<Vec<String>, OperationError> = split_rdns(dn)
        .into_iter()
        .map(|rdn| {
            let (attr, value) = rdn.split_once('=').ok_or_else(|| {
                trace!(?rdn, "rdn has no attribute type");
                OperationError::InvalidDn(dn.to_string())
            })?;
            let attr = attr.trim();
            let value = value.trim();
            if attr.is_empty() || value.is_empty() {
                return Err(OperationError::InvalidDn(dn.to_string()));
            }
            Ok(format!("{}={}", attr.to_lowercase(), value.to_lowercase()))
        })
        .collect();

    rdns.map(|r| r.join(","))
}

/// The parent of a normalised DN, or `None` if the DN is a single RDN (a suffix) or the
/// root DSE.
pub fn parent_ndn(ndn: &str) -> Option<&str> {
    let mut escaped = false;
    for (idx, c) in ndn.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => return Some(&ndn[idx + 1..]),
            _ => escaped = false,
        }
    }
    None
}

/// True if `ndn` is strictly below `base_ndn` in the tree. Every non-root entry is below
/// the root DSE.
pub fn is_descendant(ndn: &str, base_ndn: &str) -> bool {
    if base_ndn.is_empty() {
        return !ndn.is_empty();
    }
    if ndn.len() <= base_ndn.len() || !ndn.ends_with(base_ndn) {
        return false;
    }
    // The comma before the base must be a separator, not an escaped value character.
    match ndn[..ndn.len() - base_ndn.len()].strip_suffix(',') {
        Some(rdns) => rdns.chars().rev().take_while(|c| *c == '\\').count() % 2 == 0,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_descendant, normalise_dn, parent_ndn};

    #[test]
    fn test_normalise_dn() {
        assert_eq!(
            normalise_dn("uid=All_Attrs_Test, ou=People,DC=example , dc=com").unwrap(),
            "uid=all_attrs_test,ou=people,dc=example,dc=com"
        );
        assert_eq!(normalise_dn("  ").unwrap(), "");
        assert_eq!(
            normalise_dn("cn=Smith\\, John,dc=example").unwrap(),
            "cn=smith\\, john,dc=example"
        );
        assert!(normalise_dn("people").is_err());
        assert!(normalise_dn("ou=,dc=com").is_err());
    }

    #[test]
    fn test_parent_ndn() {
        assert_eq!(parent_ndn("ou=people,dc=example,dc=com"), Some("dc=example,dc=com"));
        assert_eq!(parent_ndn("cn=smith\\, john,dc=example"), Some("dc=example"));
        assert_eq!(parent_ndn("cn=config"), None);
        assert_eq!(parent_ndn(""), None);
    }

    #[test]
    fn test_is_descendant() {
        assert!(is_descendant("ou=people,dc=example,dc=com", "dc=example,dc=com"));
        assert!(is_descendant("cn=config", ""));
        assert!(!is_descendant("dc=example,dc=com", "dc=example,dc=com"));
        assert!(!is_descendant("dc=badexample,dc=com", "example,dc=com"));
        assert!(!is_descendant("", ""));
        assert!(!is_descendant("cn=a\\,dc=com", "dc=com"));
        assert!(is_descendant("cn=a\\\\,dc=com", "dc=com"));
        assert!(is_descendant("cn=smith\\, john,dc=example", "dc=example"));
    }
}
