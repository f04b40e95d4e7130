//! A reader for LDIF content records (RFC 2849). Change records are not supported.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::entry::Entry;
use crate::prelude::*;

fn ldif_error(lineno: usize, msg: &str) -> OperationError {
    admin_error!(%lineno, "ldif error - {}", msg);
    OperationError::InvalidEntryState(format!("line {lineno}: {msg}"))
}

/// Unfold continuation lines and drop comments. Each logical line is returned with the
/// number of the physical line it started on.
fn unfold(content: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    let mut in_comment = false;

    for (idx, raw) in content.lines().enumerate() {
        let lineno = idx + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(cont) = raw.strip_prefix(' ') {
            if in_comment {
                continue;
            }
            if let Some((_, last)) = lines.last_mut() {
                if !last.is_empty() {
                    last.push_str(cont);
                    continue;
                }
            }
        }

        if raw.starts_with('#') {
            in_comment = true;
            continue;
        }
        in_comment = false;
        lines.push((lineno, raw.to_string()));
    }
    lines
}

/// Split an `attr: value` or `attr:: base64` line.
fn parse_line(lineno: usize, line: &str) -> Result<(String, String), OperationError> {
    let (attr, rest) = line
        .split_once(':')
        .ok_or_else(|| ldif_error(lineno, "expected 'attribute: value'"))?;
    let attr = attr.trim();
    if attr.is_empty() {
        return Err(ldif_error(lineno, "missing attribute name"));
    }

    let value = if let Some(encoded) = rest.strip_prefix(':') {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| ldif_error(lineno, "invalid base64 value"))?;
        String::from_utf8(bytes).map_err(|_| ldif_error(lineno, "value is not valid utf8"))?
    } else if rest.starts_with('<') {
        return Err(ldif_error(lineno, "url values are not supported"));
    } else {
        rest.trim_start_matches(' ').to_string()
    };

    Ok((attr.to_string(), value))
}

/// Parse LDIF content into entries, in the order they appear.
pub fn parse_str(content: &str) -> Result<Vec<Entry>, OperationError> {
    let mut entries = Vec::new();
    let mut current: Option<Entry> = None;
    let mut first_record = true;

    for (lineno, line) in unfold(content) {
        if line.trim().is_empty() {
            if let Some(e) = current.take() {
                entries.push(e);
            }
            continue;
        }

        let (attr, value) = parse_line(lineno, &line)?;

        match current.as_mut() {
            None => {
                if first_record && attr.eq_ignore_ascii_case("version") {
                    if value.trim() != "1" {
                        return Err(ldif_error(lineno, "unsupported ldif version"));
                    }
                    first_record = false;
                    continue;
                }
                if !attr.eq_ignore_ascii_case("dn") {
                    return Err(ldif_error(lineno, "record must start with 'dn:'"));
                }
                first_record = false;
                let e = Entry::new(&value).map_err(|_| ldif_error(lineno, "invalid dn"))?;
                current = Some(e);
            }
            Some(e) => {
                if attr.eq_ignore_ascii_case("dn") {
                    return Err(ldif_error(lineno, "unexpected 'dn:' within a record"));
                }
                if attr.eq_ignore_ascii_case("changetype") {
                    return Err(ldif_error(lineno, "change records are not supported"));
                }
                e.add_ava(&attr, &value);
            }
        }
    }

    if let Some(e) = current.take() {
        entries.push(e);
    }

    trace!(count = entries.len(), "parsed ldif");
    Ok(entries)
}
