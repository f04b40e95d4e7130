use crate::constants::*;
use std::fmt;

pub use smartstring::alias::String as AttrString;

/// The attributes this server defines in its core schema. Entries may carry any other
/// attribute, which is held by name alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Aci,
    Cn,
    CreateTimestamp,
    CreatorsName,
    Dc,
    Description,
    DisplayName,
    EntryDn,
    EntryId,
    GivenName,
    Mail,
    Member,
    ModifiersName,
    ModifyTimestamp,
    NamingContexts,
    NsBackendSuffix,
    NsUniqueId,
    NumSubordinates,
    O,
    ObjectClass,
    Ou,
    ParentId,
    PasswordHistory,
    Sn,
    SubschemaSubentry,
    SupportedControl,
    SupportedExtension,
    SupportedFeatures,
    SupportedLdapVersion,
    SupportedSaslMechanisms,
    TelephoneNumber,
    Uid,
    UserPassword,
    VendorName,
    VendorVersion,
}

impl AsRef<str> for Attribute {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Attribute {
    /// The canonical spelling of this attribute, as returned to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Aci => ATTR_ACI,
            Attribute::Cn => ATTR_CN,
            Attribute::CreateTimestamp => ATTR_CREATETIMESTAMP,
            Attribute::CreatorsName => ATTR_CREATORSNAME,
            Attribute::Dc => ATTR_DC,
            Attribute::Description => ATTR_DESCRIPTION,
            Attribute::DisplayName => ATTR_DISPLAYNAME,
            Attribute::EntryDn => ATTR_ENTRYDN,
            Attribute::EntryId => ATTR_ENTRYID,
            Attribute::GivenName => ATTR_GIVENNAME,
            Attribute::Mail => ATTR_MAIL,
            Attribute::Member => ATTR_MEMBER,
            Attribute::ModifiersName => ATTR_MODIFIERSNAME,
            Attribute::ModifyTimestamp => ATTR_MODIFYTIMESTAMP,
            Attribute::NamingContexts => ATTR_NAMINGCONTEXTS,
            Attribute::NsBackendSuffix => ATTR_NSBACKENDSUFFIX,
            Attribute::NsUniqueId => ATTR_NSUNIQUEID,
            Attribute::NumSubordinates => ATTR_NUMSUBORDINATES,
            Attribute::O => ATTR_O,
            Attribute::ObjectClass => ATTR_OBJECTCLASS,
            Attribute::Ou => ATTR_OU,
            Attribute::ParentId => ATTR_PARENTID,
            Attribute::PasswordHistory => ATTR_PASSWORDHISTORY,
            Attribute::Sn => ATTR_SN,
            Attribute::SubschemaSubentry => ATTR_SUBSCHEMASUBENTRY,
            Attribute::SupportedControl => ATTR_SUPPORTEDCONTROL,
            Attribute::SupportedExtension => ATTR_SUPPORTEDEXTENSION,
            Attribute::SupportedFeatures => ATTR_SUPPORTEDFEATURES,
            Attribute::SupportedLdapVersion => ATTR_SUPPORTEDLDAPVERSION,
            Attribute::SupportedSaslMechanisms => ATTR_SUPPORTEDSASLMECHANISMS,
            Attribute::TelephoneNumber => ATTR_TELEPHONENUMBER,
            Attribute::Uid => ATTR_UID,
            Attribute::UserPassword => ATTR_USERPASSWORD,
            Attribute::VendorName => ATTR_VENDORNAME,
            Attribute::VendorVersion => ATTR_VENDORVERSION,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
