use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::attribute::AttrString;

/* ===== errors ===== */
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "lowercase")]
pub enum OperationError {
    // Logic errors, or "soft" errors.
    NoMatchingEntries,
    /// The requested attribute list could not be parsed.
    InvalidRequest(String),
    /// An explicitly requested attribute is not defined in the schema. This is a
    /// warning on the request, not a failure of the search.
    UnknownAttribute(AttrString),
    InvalidDn(String),
    InvalidEntryState(String),
    InvalidAcpState(String),
    InvalidSchemaState(String),
    InvalidConfig(String),
    // The storage or access control source could not service the request. Any
    // results already returned are incomplete.
    CollaboratorUnavailable(String),
    FsError,
}

impl PartialEq for OperationError {
    fn eq(&self, other: &Self) -> bool {
        // Only compare the kind of error. Generally we only use the PartialEq for
        // TESTING anyway.
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Eq for OperationError {}

impl Display for OperationError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut output = format!("{:?}", self)
            .split('(')
            .next()
            .unwrap_or("")
            .to_string();

        if let Some(msg) = self.message() {
            output += &format!(" - {}", msg);
        };
        f.write_str(&output)
    }
}

impl OperationError {
    /// Return the message associated with the error if there is one.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::NoMatchingEntries => Some("The search base does not exist.".into()),
            Self::InvalidRequest(msg) => Some(format!("Invalid requested attribute list: {msg}")),
            Self::UnknownAttribute(attr) => {
                Some(format!("Attribute '{attr}' is not defined in the schema"))
            }
            Self::InvalidDn(dn) => Some(format!("'{dn}' is not a valid distinguished name")),
            Self::InvalidEntryState(msg) => Some(msg.clone()),
            Self::InvalidAcpState(msg) => Some(format!("Invalid access control: {msg}")),
            Self::InvalidSchemaState(msg) => Some(format!("Invalid schema: {msg}")),
            Self::InvalidConfig(msg) => Some(format!("Invalid configuration: {msg}")),
            Self::CollaboratorUnavailable(msg) => Some(format!(
                "A storage collaborator failed, the results are incomplete: {msg}"
            )),
            Self::FsError => None,
        }
    }
}

#[test]
fn test_operationerror_as_nice_string() {
    assert_eq!(
        OperationError::CollaboratorUnavailable("timeout".to_string()).to_string(),
        "CollaboratorUnavailable - A storage collaborator failed, the results are incomplete: timeout"
            .to_string()
    );
    assert_eq!(
        OperationError::FsError.to_string(),
        "FsError".to_string()
    );
    assert_eq!(
        OperationError::UnknownAttribute("bogus".into()).to_string(),
        "UnknownAttribute - Attribute 'bogus' is not defined in the schema".to_string()
    );
}
