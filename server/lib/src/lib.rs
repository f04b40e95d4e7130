//! The directory server search library. This resolves which attributes of an entry are
//! returned for a search request, including the RFC 3673 `+` (all operational attributes)
//! selector, and reduces each entry by the access controls that apply to the requester.

#![warn(unused_extern_crates)]
// Enable some groups of clippy lints.
#![deny(clippy::suspicious)]
#![deny(clippy::perf)]
// Specific lints to enforce.
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::manual_let_else)]
#![allow(clippy::unreachable)]

#[macro_use]
extern crate tracing;

pub mod be;
pub mod config;
pub mod entry;
pub mod event;
pub mod filter;
pub mod ldif;
pub mod schema;
pub mod server;
pub mod testkit;
pub mod time;
pub mod uniqueid;
pub(crate) mod utils;

/// A prelude of imports that should be imported by all other modules to help make
/// imports cleaner.
pub mod prelude {
    pub use dirsrv_proto::attribute::{AttrString, Attribute};
    pub use dirsrv_proto::config::ReadPolicy;
    pub use dirsrv_proto::constants::*;
    pub use dirsrv_proto::internal::OperationError;
    pub use sketching::{
        admin_debug, admin_error, admin_info, admin_warn, filter_error, filter_trace,
        filter_warn, request_error, request_info, request_trace, request_warn,
        security_access, security_critical, security_error, security_info, tagged_event,
        EventTag,
    };
    pub use std::time::Duration;

    pub use crate::entry::{Entry, EntryReduced, EntryScope};
    pub use crate::event::SearchEvent;
    pub use crate::server::identity::Identity;
    pub use crate::server::QueryServer;
    pub use crate::time::duration_from_epoch_now;
}
