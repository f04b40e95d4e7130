//! Contains structures related to the Identity that initiated a search. This is the
//! identity that access controls are applied to.

use std::fmt;

use crate::prelude::*;
use crate::utils::normalise_dn;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A bound user, named by DN.
pub struct IdentUser {
    pub dn: String,
    pub ndn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The type of Identity that is related to this session.
pub enum IdentType {
    /// The server itself, or the root DN. Access controls are not applied.
    Internal,
    /// A connection that has not bound.
    Anonymous,
    User(IdentUser),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An identity that initiated a search.
pub struct Identity {
    pub origin: IdentType,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.origin {
            IdentType::Internal => write!(f, "Internal"),
            IdentType::Anonymous => write!(f, "Anonymous"),
            IdentType::User(u) => write!(f, "User( {} )", u.dn),
        }
    }
}

impl Identity {
    pub fn from_internal() -> Self {
        Identity {
            origin: IdentType::Internal,
        }
    }

    pub fn anonymous() -> Self {
        Identity {
            origin: IdentType::Anonymous,
        }
    }

    /// An identity bound as this DN. The empty DN is an anonymous bind.
    pub fn from_dn(dn: &str) -> Result<Self, OperationError> {
        let ndn = normalise_dn(dn)?;
        if ndn.is_empty() {
            return Ok(Self::anonymous());
        }
        Ok(Identity {
            origin: IdentType::User(IdentUser {
                dn: dn.trim().to_string(),
                ndn,
            }),
        })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.origin, IdentType::Internal)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.origin, IdentType::Anonymous)
    }

    /// The normalised DN of a bound user.
    pub fn get_ndn(&self) -> Option<&str> {
        match &self.origin {
            IdentType::User(u) => Some(u.ndn.as_str()),
            IdentType::Internal | IdentType::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_dn() {
        let ident = Identity::from_dn("uid=All_Attrs_Test, ou=people,dc=example,dc=com").unwrap();
        assert_eq!(
            ident.get_ndn(),
            Some("uid=all_attrs_test,ou=people,dc=example,dc=com")
        );
        assert_eq!(
            ident.to_string(),
            "User( uid=All_Attrs_Test, ou=people,dc=example,dc=com )"
        );
        assert!(!ident.is_internal());

        assert!(Identity::from_dn("").unwrap().is_anonymous());
        assert!(Identity::from_dn("bogus").is_err());
        assert_eq!(Identity::from_internal().get_ndn(), None);
        assert!(Identity::from_internal().is_internal());
    }
}
