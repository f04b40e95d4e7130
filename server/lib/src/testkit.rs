//! A ready made directory for tests. This holds a root DSE, the `dc=example,dc=com` suffix
//! with a people container and one user, and a small `cn=config` tree. The suffix carries
//! an ACI that denies the test user read access to `modifiersName`.

use std::sync::Arc;

use crate::be::MemoryBackend;
use crate::config::ServerConfig;
use crate::prelude::*;
use crate::schema::Schema;
use crate::server::identity::Identity;
use crate::server::QueryServer;

pub const TEST_SUFFIX: &str = "dc=example,dc=com";
pub const DN_PEOPLE: &str = "ou=people,dc=example,dc=com";
pub const TEST_USER_NAME: &str = "all_attrs_test";
pub const TEST_USER_DN: &str = "uid=all_attrs_test,ou=people,dc=example,dc=com";

/// The time all fixture entries are created at, `20260101083000Z`.
pub const FIXTURE_CT: Duration = Duration::from_secs(1_767_256_200);

pub const FIXTURE_LDIF: &str = r#"version: 1

dn:
objectClass: top
namingContexts: dc=example,dc=com
nsBackendSuffix: userRoot:dc=example,dc=com
subschemaSubentry: cn=schema
supportedControl: 2.16.840.1.113730.3.4.2
supportedControl: 1.2.840.113556.1.4.319
supportedExtension: 1.3.6.1.4.1.4203.1.11.3
supportedFeatures: 1.3.6.1.4.1.4203.1.5.1
supportedLDAPVersion: 2
supportedLDAPVersion: 3
supportedSASLMechanisms: EXTERNAL
supportedSASLMechanisms: GSSAPI
vendorName: 389 Project
vendorVersion: 389-Directory/3.1.0
aci: (targetattr = "aci")(version 3.0; acl "Hide root DSE aci"; deny (read, search, compare) userdn = "ldap:///anyone";)

dn: dc=example,dc=com
objectClass: top
objectClass: domain
dc: example
description: dc=example,dc=com
aci: (targetattr= "modifiersName")(version 3.0; acl "Deny modifiersName for user"; deny (read) userdn = "ldap:///uid=all_attrs_test,ou=people,dc=example,dc=com";)

dn: ou=people,dc=example,dc=com
objectClass: top
objectClass: organizationalUnit
ou: people
aci: (targetattr = "objectClass || ou || description")(version 3.0; acl "Enable anyone ou read"; allow (read, search, compare) userdn = "ldap:///anyone";)

dn: uid=all_attrs_test,ou=people,dc=example,dc=com
objectClass: top
objectClass: person
objectClass: organizationalPerson
objectClass: inetOrgPerson
cn: all_attrs_test
sn: all_attrs_test
uid: all_attrs_test
mail: all_attrs_test@example.com
userPassword: all_attrs_test

dn: cn=config
objectClass: top
objectClass: extensibleObject
cn: config
nsslapd-port: 389
passwordHistory: off

dn: cn=monitor,cn=config
objectClass: top
objectClass: extensibleObject
cn: monitor

dn: cn=plugins,cn=config
objectClass: top
objectClass: nsContainer
cn: plugins
"#;

/// A backend loaded with [`FIXTURE_LDIF`], created by the root DN.
#[allow(clippy::expect_used)]
pub fn setup_test_backend() -> MemoryBackend {
    sketching::test_init();
    let mut be = MemoryBackend::new();
    be.load_ldif(FIXTURE_LDIF, DEFAULT_ROOT_DN, FIXTURE_CT)
        .expect("Failed to load fixture ldif");
    be
}

/// A query server over the fixture backend with this configuration.
pub fn setup_test_server_with(config: ServerConfig) -> QueryServer {
    let be = Arc::new(setup_test_backend());
    QueryServer::new(
        Arc::new(Schema::core().clone()),
        be.clone(),
        be,
        Arc::new(config),
    )
}

/// A query server over the fixture backend with the default configuration.
pub fn setup_test_server() -> QueryServer {
    setup_test_server_with(ServerConfig::default())
}

/// The identity of the fixture test user.
#[allow(clippy::expect_used)]
pub fn test_user_identity() -> Identity {
    Identity::from_dn(TEST_USER_DN).expect("Invalid test user dn")
}
