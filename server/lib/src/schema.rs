//! [`Schema`] classifies every attribute the server knows about. The classification
//! decides if an attribute is returned for `*` (user attributes) or for `+`
//! (operational attributes, RFC 3673), and which kinds of entry it may ever appear on.
//!
//! The core schema is a static table that is built once on first use and never changes
//! afterwards, so it can be shared between any number of concurrent searches.

use std::sync::LazyLock;

use hashbrown::HashMap;

use crate::entry::EntryScope;
use crate::prelude::*;

/// Is this attribute user data, or maintained by the server?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    User,
    Operational,
}

/// Which kinds of entry an attribute may be returned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeScope {
    /// Only the root DSE.
    RootDse,
    /// Directory and configuration entries, never the root DSE.
    Entry,
    Both,
}

impl AttributeScope {
    pub fn permits(self, scope: EntryScope) -> bool {
        match (self, scope) {
            (AttributeScope::Both, _) => true,
            (AttributeScope::RootDse, EntryScope::RootDse) => true,
            (AttributeScope::Entry, EntryScope::Entry | EntryScope::Config) => true,
            _ => false,
        }
    }
}

/// An item describing an attribute. These are immutable once the schema is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAttribute {
    /// The canonical spelling, used when the attribute is returned to a client.
    pub name: AttrString,
    pub kind: AttributeKind,
    pub scope: AttributeScope,
    pub description: String,
}

impl SchemaAttribute {
    pub fn user(attr: Attribute, description: &str) -> Self {
        SchemaAttribute {
            name: AttrString::from(attr.as_str()),
            kind: AttributeKind::User,
            scope: AttributeScope::Both,
            description: description.to_string(),
        }
    }

    pub fn operational(attr: Attribute, scope: AttributeScope, description: &str) -> Self {
        SchemaAttribute {
            name: AttrString::from(attr.as_str()),
            kind: AttributeKind::Operational,
            scope,
            description: description.to_string(),
        }
    }

    /// The lookup key of this attribute.
    pub fn key(&self) -> AttrString {
        AttrString::from(self.name.to_lowercase())
    }

    pub fn is_operational(&self) -> bool {
        self.kind == AttributeKind::Operational
    }
}

/// The attributes the server is started with.
pub fn core_attributes() -> Vec<SchemaAttribute> {
    use AttributeScope::*;
    vec![
        SchemaAttribute::user(Attribute::ObjectClass, "The classes of the entry"),
        SchemaAttribute::user(Attribute::Cn, "Common name"),
        SchemaAttribute::user(Attribute::Sn, "Surname"),
        SchemaAttribute::user(Attribute::Uid, "User identifier"),
        SchemaAttribute::user(Attribute::Mail, "Email address"),
        SchemaAttribute::user(Attribute::UserPassword, "User password"),
        SchemaAttribute::user(Attribute::Ou, "Organizational unit name"),
        SchemaAttribute::user(Attribute::Dc, "Domain component"),
        SchemaAttribute::user(Attribute::O, "Organization name"),
        SchemaAttribute::user(Attribute::Description, "Descriptive text"),
        SchemaAttribute::user(Attribute::GivenName, "Given name"),
        SchemaAttribute::user(Attribute::DisplayName, "Preferred display name"),
        SchemaAttribute::user(Attribute::TelephoneNumber, "Telephone number"),
        SchemaAttribute::user(Attribute::Member, "Group members"),
        // Root DSE only.
        SchemaAttribute::operational(
            Attribute::NamingContexts,
            RootDse,
            "Suffixes held by this server",
        ),
        SchemaAttribute::operational(
            Attribute::SupportedControl,
            RootDse,
            "Supported control OIDs",
        ),
        SchemaAttribute::operational(
            Attribute::SupportedExtension,
            RootDse,
            "Supported extended operation OIDs",
        ),
        SchemaAttribute::operational(
            Attribute::SupportedFeatures,
            RootDse,
            "Supported feature OIDs",
        ),
        SchemaAttribute::operational(
            Attribute::SupportedLdapVersion,
            RootDse,
            "Supported protocol versions",
        ),
        SchemaAttribute::operational(
            Attribute::SupportedSaslMechanisms,
            RootDse,
            "Supported SASL mechanisms",
        ),
        SchemaAttribute::operational(Attribute::VendorName, RootDse, "Server vendor"),
        SchemaAttribute::operational(Attribute::VendorVersion, RootDse, "Server version"),
        SchemaAttribute::operational(
            Attribute::SubschemaSubentry,
            RootDse,
            "Location of the subschema entry",
        ),
        SchemaAttribute::operational(
            Attribute::NsBackendSuffix,
            RootDse,
            "Backend and suffix pairs",
        ),
        // Maintained on every entry that carries them, the root DSE included.
        SchemaAttribute::operational(Attribute::CreateTimestamp, Both, "Time the entry was added"),
        SchemaAttribute::operational(Attribute::CreatorsName, Both, "DN that added the entry"),
        SchemaAttribute::operational(
            Attribute::ModifiersName,
            Both,
            "DN that last modified the entry",
        ),
        SchemaAttribute::operational(
            Attribute::ModifyTimestamp,
            Both,
            "Time the entry was last modified",
        ),
        SchemaAttribute::operational(Attribute::NsUniqueId, Both, "Unique identifier of the entry"),
        SchemaAttribute::operational(Attribute::Aci, Both, "Access control instructions"),
        // Directory and configuration entries.
        SchemaAttribute::operational(Attribute::EntryDn, Entry, "DN of the entry"),
        SchemaAttribute::operational(Attribute::EntryId, Entry, "Backend identifier of the entry"),
        SchemaAttribute::operational(
            Attribute::ParentId,
            Entry,
            "Backend identifier of the parent",
        ),
        SchemaAttribute::operational(
            Attribute::NumSubordinates,
            Entry,
            "Count of immediate children",
        ),
        SchemaAttribute::operational(Attribute::PasswordHistory, Entry, "Password history policy"),
    ]
}

static CORE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema {
    attributes: core_attributes()
        .into_iter()
        .map(|a| (a.key(), a))
        .collect(),
});

/// The set of attribute descriptors the server uses to classify attributes.
#[derive(Debug, Clone)]
pub struct Schema {
    attributes: HashMap<AttrString, SchemaAttribute>,
}

impl Schema {
    /// Build a schema from a set of attributes. Names must be unique ignoring case.
    pub fn new<I>(attrs: I) -> Result<Self, OperationError>
    where
        I: IntoIterator<Item = SchemaAttribute>,
    {
        let mut attributes = HashMap::new();
        for attr in attrs {
            let key = attr.key();
            if attributes.contains_key(&key) {
                admin_error!(attr = %attr.name, "duplicate attribute in schema");
                return Err(OperationError::InvalidSchemaState(format!(
                    "duplicate attribute {}",
                    attr.name
                )));
            }
            attributes.insert(key, attr);
        }
        Ok(Schema { attributes })
    }

    /// The core schema. This is initialised once and shared for the life of the process.
    pub fn core() -> &'static Schema {
        &CORE_SCHEMA
    }

    /// Look up an attribute by name, ignoring case.
    pub fn classify(&self, name: &str) -> Result<&SchemaAttribute, OperationError> {
        self.attributes
            .get(name.to_lowercase().as_str())
            .ok_or_else(|| OperationError::UnknownAttribute(AttrString::from(name)))
    }

    /// Classify an attribute that is held by an entry. Attributes the schema does not
    /// define are user data that may appear on any entry.
    pub fn classify_present(&self, key: &str) -> (AttributeKind, AttributeScope) {
        match self.attributes.get(key) {
            Some(sa) => (sa.kind, sa.scope),
            None => {
                trace!(?key, "attribute not in schema, treating as user attribute");
                (AttributeKind::User, AttributeScope::Both)
            }
        }
    }

    /// The spelling to use when returning this attribute.
    pub fn display_name<'a>(&'a self, key: &str) -> Option<&'a str> {
        self.attributes.get(key).map(|sa| sa.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_core_is_valid() {
        let schema = Schema::new(core_attributes()).expect("core schema has duplicates");
        assert_eq!(schema.len(), Schema::core().len());
    }

    #[test]
    fn test_schema_classify() {
        let schema = Schema::core();

        let sa = schema.classify("NAMINGCONTEXTS").unwrap();
        assert_eq!(sa.name.as_str(), "namingContexts");
        assert_eq!(sa.kind, AttributeKind::Operational);
        assert_eq!(sa.scope, AttributeScope::RootDse);

        let sa = schema.classify(Attribute::ObjectClass.as_str()).unwrap();
        assert!(!sa.is_operational());

        let sa = schema.classify("entrydn").unwrap();
        assert_eq!(sa.scope, AttributeScope::Entry);

        assert_eq!(
            schema.classify("notAnAttribute"),
            Err(OperationError::UnknownAttribute("notAnAttribute".into()))
        );
    }

    #[test]
    fn test_schema_duplicate_rejected() {
        let r = Schema::new(vec![
            SchemaAttribute::user(Attribute::Cn, "Common name"),
            SchemaAttribute::user(Attribute::Cn, "Common name again"),
        ]);
        assert!(matches!(r, Err(OperationError::InvalidSchemaState(_))));
    }

    #[test]
    fn test_schema_scope_permits() {
        assert!(AttributeScope::RootDse.permits(EntryScope::RootDse));
        assert!(!AttributeScope::RootDse.permits(EntryScope::Entry));
        assert!(!AttributeScope::RootDse.permits(EntryScope::Config));
        assert!(AttributeScope::Entry.permits(EntryScope::Config));
        assert!(!AttributeScope::Entry.permits(EntryScope::RootDse));
        assert!(AttributeScope::Both.permits(EntryScope::RootDse));
    }

    #[test]
    fn test_schema_classify_present_unknown() {
        let schema = Schema::core();
        assert_eq!(
            schema.classify_present("nsslapd-port"),
            (AttributeKind::User, AttributeScope::Both)
        );
        assert_eq!(
            schema.classify_present("modifiersname"),
            (AttributeKind::Operational, AttributeScope::Both)
        );
        assert_eq!(schema.display_name("supportedldapversion"), Some("supportedLDAPVersion"));
        assert_eq!(schema.display_name("nsslapd-port"), None);
    }
}
