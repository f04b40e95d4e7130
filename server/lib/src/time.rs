use std::time::{Duration, SystemTime};

use time::macros::format_description;
use time::OffsetDateTime;

use crate::prelude::*;

/// Return the current time as a duration from the unix epoch.
#[allow(clippy::expect_used)]
pub fn duration_from_epoch_now() -> Duration {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("The system clock is before the unix epoch")
}

/// Render a duration from the unix epoch as an LDAP generalized time in UTC (RFC 4517
/// section 3.3.13), for example `20260101083000Z`.
pub fn generalized_time(ct: Duration) -> Result<String, OperationError> {
    let secs = i64::try_from(ct.as_secs()).map_err(|_| {
        admin_error!(?ct, "time is out of range");
        OperationError::InvalidEntryState(format!("time out of range: {ct:?}"))
    })?;
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| e.to_string())
        .and_then(|odt| {
            odt.format(format_description!(
                "[year][month][day][hour][minute][second]Z"
            ))
            .map_err(|e| e.to_string())
        })
        .map_err(|e| {
            admin_error!(?ct, ?e, "unable to format generalized time");
            OperationError::InvalidEntryState(e)
        })
}
