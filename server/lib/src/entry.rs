//! Entries are the base unit of data in the directory. An [`Entry`] is a DN and a set of
//! attribute value assertions (avas). Attribute names are held by their lower case key so
//! that every lookup is case insensitive, while the spelling the entry was created with is
//! retained for attributes the schema does not know about.
//!
//! An entry held by a backend is immutable. To return an entry to a client it is reduced
//! with [`Entry::reduce_attributes`] to the set of attributes the requester asked for and
//! is allowed to read, producing an [`EntryReduced`].

use std::collections::{BTreeMap, BTreeSet};

use ldap3_proto::simple::{LdapPartialAttribute, LdapSearchResultEntry};

use crate::prelude::*;
use crate::schema::Schema;
use crate::utils::normalise_dn;

/// What kind of entry this is. This determines which operational attributes may
/// ever be returned from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryScope {
    /// The entry with the empty DN.
    RootDse,
    /// A normal entry within a backend suffix.
    Entry,
    /// An entry within the `cn=config` tree.
    Config,
}

impl EntryScope {
    /// Infer the scope of an entry from its normalised DN.
    pub fn from_ndn(ndn: &str) -> Self {
        if ndn.is_empty() {
            EntryScope::RootDse
        } else if ndn == DN_CONFIG || ndn.ends_with(",cn=config") {
            EntryScope::Config
        } else {
            EntryScope::Entry
        }
    }
}

/// The values of one attribute, along with the spelling of its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ava {
    pub name: AttrString,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    dn: String,
    ndn: String,
    scope: EntryScope,
    attrs: BTreeMap<AttrString, Ava>,
}

impl Entry {
    pub fn new(dn: &str) -> Result<Self, OperationError> {
        let ndn = normalise_dn(dn)?;
        let scope = EntryScope::from_ndn(&ndn);
        Ok(Entry {
            dn: dn.trim().to_string(),
            ndn,
            scope,
            attrs: BTreeMap::new(),
        })
    }

    pub fn get_dn(&self) -> &str {
        &self.dn
    }

    /// The normalised DN, used for all comparisons.
    pub fn get_ndn(&self) -> &str {
        &self.ndn
    }

    pub fn scope(&self) -> EntryScope {
        self.scope
    }

    /// Add a value to an attribute. Duplicate values (ignoring case) are not added twice.
    pub fn add_ava(&mut self, attr: &str, value: &str) {
        let key = AttrString::from(attr.to_lowercase());
        let ava = self.attrs.entry(key).or_insert_with(|| Ava {
            name: AttrString::from(attr),
            values: Vec::with_capacity(1),
        });
        if !ava.values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            ava.values.push(value.to_string());
        }
    }

    /// Replace all values of an attribute.
    pub fn set_ava<I, S>(&mut self, attr: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = AttrString::from(attr.to_lowercase());
        let values: Vec<String> = values.into_iter().map(|v| v.into()).collect();
        if values.is_empty() {
            self.attrs.remove(&key);
        } else {
            self.attrs.insert(
                key,
                Ava {
                    name: AttrString::from(attr),
                    values,
                },
            );
        }
    }

    pub fn purge_ava(&mut self, attr: &str) {
        self.attrs.remove(attr.to_lowercase().as_str());
    }

    pub fn get_ava(&self, attr: &str) -> Option<&[String]> {
        self.attrs
            .get(attr.to_lowercase().as_str())
            .map(|ava| ava.values.as_slice())
    }

    /// The value of an attribute that is expected to hold exactly one value.
    pub fn get_ava_single(&self, attr: &str) -> Option<&str> {
        match self.get_ava(attr) {
            Some([v]) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn attribute_pres(&self, attr: &str) -> bool {
        self.attrs.contains_key(attr.to_lowercase().as_str())
    }

    /// Does this attribute hold this value? Values are compared ignoring case.
    pub fn attribute_equality(&self, attr: &str, value: &str) -> bool {
        self.get_ava(attr)
            .map(|vs| vs.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }

    /// The keys of every attribute this entry holds.
    pub fn attr_keys(&self) -> impl Iterator<Item = &AttrString> {
        self.attrs.keys()
    }

    /// Remove every attribute not in `allowed`. The attributes that remain are named with
    /// the schema spelling where the schema defines one.
    pub fn reduce_attributes(
        &self,
        allowed: &BTreeSet<AttrString>,
        schema: &Schema,
    ) -> EntryReduced {
        let attrs = self
            .attrs
            .iter()
            .filter(|(k, _)| allowed.contains(*k))
            .map(|(k, ava)| {
                let name = schema
                    .display_name(k)
                    .map(AttrString::from)
                    .unwrap_or_else(|| ava.name.clone());
                (
                    k.clone(),
                    Ava {
                        name,
                        values: ava.values.clone(),
                    },
                )
            })
            .collect();

        EntryReduced {
            dn: self.dn.clone(),
            attrs,
        }
    }
}

/// An entry that has been reduced to what the requester may see. This is the form sent
/// back to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReduced {
    dn: String,
    attrs: BTreeMap<AttrString, Ava>,
}

impl EntryReduced {
    pub fn get_dn(&self) -> &str {
        &self.dn
    }

    pub fn get_ava(&self, attr: &str) -> Option<&[String]> {
        self.attrs
            .get(attr.to_lowercase().as_str())
            .map(|ava| ava.values.as_slice())
    }

    /// The lower case names of the attributes in this entry.
    pub fn attr_names(&self) -> BTreeSet<&str> {
        self.attrs.keys().map(|k| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn to_ldap(&self) -> LdapSearchResultEntry {
        let attributes = self
            .attrs
            .values()
            .map(|ava| LdapPartialAttribute {
                atype: ava.name.to_string(),
                vals: ava.values.iter().map(|v| v.as_bytes().to_vec()).collect(),
            })
            .collect();

        LdapSearchResultEntry {
            dn: self.dn.clone(),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_scope_from_dn() {
        assert_eq!(Entry::new("").unwrap().scope(), EntryScope::RootDse);
        assert_eq!(Entry::new("cn=config").unwrap().scope(), EntryScope::Config);
        assert_eq!(
            Entry::new("cn=Monitor, CN=Config").unwrap().scope(),
            EntryScope::Config
        );
        assert_eq!(
            Entry::new("ou=people,dc=example,dc=com").unwrap().scope(),
            EntryScope::Entry
        );
        assert_eq!(
            Entry::new("cn=configuration,dc=example,dc=com").unwrap().scope(),
            EntryScope::Entry
        );
        assert!(Entry::new("not a dn").is_err());
    }

    #[test]
    fn test_entry_avas() {
        let mut e = Entry::new("uid=test,dc=example,dc=com").unwrap();
        e.add_ava("objectClass", "top");
        e.add_ava("objectclass", "person");
        e.add_ava("OBJECTCLASS", "Person");
        assert_eq!(
            e.get_ava("objectClass"),
            Some(["top".to_string(), "person".to_string()].as_slice())
        );
        assert!(e.attribute_equality("objectclass", "PERSON"));
        assert!(!e.attribute_equality("objectclass", "group"));
        assert!(e.attribute_pres("ObjectClass"));

        e.set_ava("uid", ["test"]);
        assert_eq!(e.get_ava_single("uid"), Some("test"));
        assert_eq!(e.get_ava_single("objectclass"), None);

        e.set_ava("uid", Vec::<String>::new());
        assert!(!e.attribute_pres("uid"));

        e.purge_ava("objectClass");
        assert_eq!(e.attr_keys().count(), 0);
    }

    #[test]
    fn test_entry_reduce_attributes() {
        let mut e = Entry::new("uid=test,dc=example,dc=com").unwrap();
        e.add_ava("objectclass", "top");
        e.add_ava("modifiersname", "cn=directory manager");
        e.add_ava("nsslapd-Port", "389");
        e.add_ava("uid", "test");

        let allowed: BTreeSet<AttrString> = ["objectclass", "modifiersname", "nsslapd-port"]
            .into_iter()
            .map(AttrString::from)
            .collect();

        let r = e.reduce_attributes(&allowed, Schema::core());
        assert_eq!(
            r.attr_names(),
            ["modifiersname", "nsslapd-port", "objectclass"]
                .into_iter()
                .collect::<BTreeSet<_>>()
        );
        assert!(r.get_ava("uid").is_none());

        let ldap = r.to_ldap();
        assert_eq!(ldap.dn, "uid=test,dc=example,dc=com");
        let names: Vec<&str> = ldap.attributes.iter().map(|a| a.atype.as_str()).collect();
        assert_eq!(names, vec!["modifiersName", "nsslapd-Port", "objectClass"]);
        assert_eq!(ldap.attributes[2].vals, vec![b"top".to_vec()]);
    }

    #[test]
    fn test_entry_reduce_to_nothing() {
        let mut e = Entry::new("dc=example,dc=com").unwrap();
        e.add_ava("dc", "example");
        let r = e.reduce_attributes(&BTreeSet::new(), Schema::core());
        assert!(r.is_empty());
        assert!(r.to_ldap().attributes.is_empty());
    }
}
