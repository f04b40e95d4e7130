//! Resolution of the requested attribute list of a search into the attributes to return
//! from each entry, before access control is applied.

use std::collections::BTreeSet;

use crate::entry::Entry;
use crate::prelude::*;
use crate::schema::{AttributeKind, Schema};

/// The parsed form of a requested attribute list. This is built once per search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedAttrs {
    /// `*`, or an empty request.
    pub all_user: bool,
    /// `+`
    pub all_operational: bool,
    /// Schema keys of attributes named explicitly.
    pub explicit: BTreeSet<AttrString>,
}

fn is_keychar(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// A descriptor is either `name` (a letter followed by letters, digits and hyphens) or a
/// numeric OID.
fn valid_descriptor(d: &str) -> bool {
    let mut chars = d.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(is_keychar),
        Some(c) if c.is_ascii_digit() => d
            .split('.')
            .all(|arc| !arc.is_empty() && arc.chars().all(|c| c.is_ascii_digit())),
        _ => false,
    }
}

/// Check a token of the form `descriptor *( ";" option )`, returning the descriptor.
fn attribute_description(token: &str) -> Option<&str> {
    let mut parts = token.split(';');
    let descriptor = parts.next()?;
    if !valid_descriptor(descriptor) {
        return None;
    }
    if parts.all(|opt| !opt.is_empty() && opt.chars().all(is_keychar)) {
        Some(descriptor)
    } else {
        None
    }
}

impl RequestedAttrs {
    /// Parse a requested attribute list. Names the schema does not know are dropped, and
    /// returned as [`OperationError::UnknownAttribute`] warnings. A malformed token fails
    /// the whole request.
    pub fn parse(
        tokens: &[String],
        schema: &Schema,
    ) -> Result<(Self, Vec<OperationError>), OperationError> {
        let mut req = RequestedAttrs::default();
        let mut warnings = Vec::new();

        if tokens.is_empty() {
            req.all_user = true;
            return Ok((req, warnings));
        }

        for token in tokens {
            match token.as_str() {
                REQ_ALL_USER_ATTRS => req.all_user = true,
                REQ_ALL_OPERATIONAL_ATTRS => req.all_operational = true,
                // Only meaningful alone, and then the empty default is what we want.
                REQ_NO_ATTRS => {}
                other => {
                    let descriptor = attribute_description(other).ok_or_else(|| {
                        request_error!(token = ?other, "malformed attribute in request");
                        OperationError::InvalidRequest(format!(
                            "malformed requested attribute '{other}'"
                        ))
                    })?;
                    match schema.classify(descriptor) {
                        Ok(sa) => {
                            req.explicit.insert(sa.key());
                        }
                        Err(e) => {
                            request_warn!(
                                attr = %descriptor,
                                "requested attribute is not in the schema"
                            );
                            warnings.push(e);
                        }
                    }
                }
            }
        }

        Ok((req, warnings))
    }

    /// True if no attribute can ever be selected by this request.
    pub fn is_empty(&self) -> bool {
        !self.all_user && !self.all_operational && self.explicit.is_empty()
    }

    /// The keys of the attributes of `entry` this request selects. Attributes whose schema
    /// scope excludes the kind of entry are never selected.
    pub fn select(&self, entry: &Entry, schema: &Schema) -> BTreeSet<AttrString> {
        let entry_scope = entry.scope();
        entry
            .attr_keys()
            .filter(|key| {
                let (kind, scope) = schema.classify_present(key);
                if !scope.permits(entry_scope) {
                    trace!(%key, ?entry_scope, "attribute not permitted on this entry scope");
                    return false;
                }
                match kind {
                    AttributeKind::User if self.all_user => true,
                    AttributeKind::Operational if self.all_operational => true,
                    _ => self.explicit.contains(key.as_str()),
                }
            })
            .cloned()
            .collect()
    }
}
