#![deny(warnings)]
#![warn(unused_extern_crates)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
use num_enum::IntoPrimitive;
use std::fmt;
use tracing_forest::printer::TestCapturePrinter;
use tracing_forest::tag::NoTag;
use tracing_forest::ForestLayer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

pub mod macros;

pub use {tracing, tracing_forest, tracing_subscriber};

/// Start up the logging for test mode.
pub fn test_init() {
    let filter = EnvFilter::from_default_env().add_directive(LevelFilter::TRACE.into());

    // start the logging!
    let _ = tracing_subscriber::Registry::default()
        .with(ForestLayer::new(TestCapturePrinter::new(), NoTag).with_filter(filter))
        .try_init();
}

/// Start up the logging for a server process. The directive is an [`EnvFilter`]
/// directive such as `info` or `dirsrv_lib=debug,info`. `RUST_LOG` overrides it when set.
pub fn init(directive: &str) -> Result<(), String> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env_directive) => EnvFilter::try_new(env_directive),
        Err(_) => EnvFilter::try_new(directive),
    }
    .map_err(|e| format!("invalid log filter directive '{directive}' - {e}"))?;

    tracing_subscriber::Registry::default()
        .with(ForestLayer::default().with_filter(filter))
        .try_init()
        .map_err(|e| format!("unable to start logging - {e}"))
}

/// The category of an event. This is attached to every event emitted by the tagged
/// macros as the `event_tag_id` field so that log consumers can route on it.
#[derive(Debug, Clone, Copy, IntoPrimitive)]
#[repr(u64)]
pub enum EventTag {
    AdminDebug,
    AdminError,
    AdminWarn,
    AdminInfo,
    RequestError,
    RequestWarn,
    RequestInfo,
    RequestTrace,
    SecurityCritical,
    SecurityInfo,
    SecurityAccess,
    SecurityError,
    FilterError,
    FilterWarn,
    FilterTrace,
}

impl EventTag {
    pub fn pretty(self) -> &'static str {
        match self {
            EventTag::AdminDebug => "admin.debug",
            EventTag::AdminError => "admin.error",
            EventTag::AdminWarn => "admin.warn",
            EventTag::AdminInfo => "admin.info",
            EventTag::RequestError => "request.error",
            EventTag::RequestWarn => "request.warn",
            EventTag::RequestInfo => "request.info",
            EventTag::RequestTrace => "request.trace",
            EventTag::SecurityCritical => "security.critical",
            EventTag::SecurityInfo => "security.info",
            EventTag::SecurityAccess => "security.access",
            EventTag::SecurityError => "security.error",
            EventTag::FilterError => "filter.error",
            EventTag::FilterWarn => "filter.warn",
            EventTag::FilterTrace => "filter.trace",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::EventTag;

    #[test]
    fn test_event_tag_ids() {
        let id: u64 = EventTag::AdminDebug.into();
        assert_eq!(id, 0);
        let id: u64 = EventTag::SecurityAccess.into();
        assert_eq!(id, 10);
        assert_eq!(EventTag::FilterTrace.to_string(), "filter.trace");
    }

    #[test]
    fn test_tagged_macros_expand() {
        super::test_init();
        let attr = "modifiersName";
        crate::admin_info!("admin {}", 1);
        crate::request_warn!(?attr, "request warning");
        crate::security_access!(attr = %attr, "access decision");
        crate::filter_trace!("filter trace");
    }
}
