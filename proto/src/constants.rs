//! Because consistency is great!
//!
//! Attribute names are given in their canonical spelling. Comparisons are made on the
//! lower case form.

/// The default root DN. Binding as this DN bypasses access controls.
pub const DEFAULT_ROOT_DN: &str = "cn=Directory Manager";

/// The DN of the server configuration container.
pub const DN_CONFIG: &str = "cn=config";

/// RFC 4511 - request all user attributes.
pub const REQ_ALL_USER_ATTRS: &str = "*";
/// RFC 3673 - request all operational attributes.
pub const REQ_ALL_OPERATIONAL_ATTRS: &str = "+";
/// RFC 4511 - request no attributes.
pub const REQ_NO_ATTRS: &str = "1.1";

/// The OID advertised in supportedFeatures for RFC 3673.
pub const OID_ALL_OPERATIONAL_ATTRS: &str = "1.3.6.1.4.1.4203.1.5.1";

// User attributes
pub const ATTR_OBJECTCLASS: &str = "objectClass";
pub const ATTR_CN: &str = "cn";
pub const ATTR_SN: &str = "sn";
pub const ATTR_UID: &str = "uid";
pub const ATTR_MAIL: &str = "mail";
pub const ATTR_USERPASSWORD: &str = "userPassword";
pub const ATTR_OU: &str = "ou";
pub const ATTR_DC: &str = "dc";
pub const ATTR_O: &str = "o";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_GIVENNAME: &str = "givenName";
pub const ATTR_DISPLAYNAME: &str = "displayName";
pub const ATTR_TELEPHONENUMBER: &str = "telephoneNumber";
pub const ATTR_MEMBER: &str = "member";

// Root DSE operational attributes
pub const ATTR_NAMINGCONTEXTS: &str = "namingContexts";
pub const ATTR_SUPPORTEDCONTROL: &str = "supportedControl";
pub const ATTR_SUPPORTEDEXTENSION: &str = "supportedExtension";
pub const ATTR_SUPPORTEDFEATURES: &str = "supportedFeatures";
pub const ATTR_SUPPORTEDLDAPVERSION: &str = "supportedLDAPVersion";
pub const ATTR_SUPPORTEDSASLMECHANISMS: &str = "supportedSASLMechanisms";
pub const ATTR_VENDORNAME: &str = "vendorName";
pub const ATTR_VENDORVERSION: &str = "vendorVersion";
pub const ATTR_SUBSCHEMASUBENTRY: &str = "subschemaSubentry";
pub const ATTR_NSBACKENDSUFFIX: &str = "nsBackendSuffix";

// Entry operational attributes
pub const ATTR_CREATETIMESTAMP: &str = "createTimestamp";
pub const ATTR_CREATORSNAME: &str = "creatorsName";
pub const ATTR_MODIFIERSNAME: &str = "modifiersName";
pub const ATTR_MODIFYTIMESTAMP: &str = "modifyTimestamp";
pub const ATTR_ENTRYDN: &str = "entryDN";
pub const ATTR_ENTRYID: &str = "entryID";
pub const ATTR_NSUNIQUEID: &str = "nsUniqueId";
pub const ATTR_NUMSUBORDINATES: &str = "numSubordinates";
pub const ATTR_PARENTID: &str = "parentID";
pub const ATTR_ACI: &str = "aci";
pub const ATTR_PASSWORDHISTORY: &str = "passwordHistory";
