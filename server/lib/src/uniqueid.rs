//! Generation of `nsUniqueId` values. These are uuids rendered as four dash separated
//! groups of eight hex digits, for example `a6c3e781-1dd211b2-8068b8a4-4e4f7b7c`.

use uuid::Uuid;

use crate::prelude::*;

/// A new random unique id.
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// A unique id derived from a name within a namespace. The same namespace and name always
/// produce the same id. Without a namespace the nil uuid is used.
pub fn generate_from_name(namespace: Option<&Uuid>, name: &[u8]) -> Result<Uuid, OperationError> {
    if name.is_empty() {
        admin_error!("unable to generate a unique id from an empty name");
        return Err(OperationError::InvalidRequest(
            "unique id name may not be empty".to_string(),
        ));
    }
    let namespace = namespace.copied().unwrap_or_else(Uuid::nil);
    Ok(Uuid::new_v5(&namespace, name))
}

/// Render a uuid in the unique id format.
pub fn format(u: &Uuid) -> String {
    let hex = u.simple().to_string();
    format!(
        "{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..16],
        &hex[16..24],
        &hex[24..32]
    )
}

/// Parse a value in the unique id format. The standard uuid form is also accepted.
pub fn parse(value: &str) -> Result<Uuid, OperationError> {
    let groups: Vec<&str> = value.split('-').collect();
    let parsed = if groups.len() == 4 && groups.iter().all(|g| g.len() == 8) {
        Uuid::try_parse(&groups.concat())
    } else {
        Uuid::try_parse(value)
    };
    parsed.map_err(|e| {
        request_warn!(?value, ?e, "invalid unique id");
        OperationError::InvalidRequest(format!("invalid unique id {value}"))
    })
}
