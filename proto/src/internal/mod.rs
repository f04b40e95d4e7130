//! Directory server internal elements
//!
//! Items defined in this module *may* change between releases without notice.

mod error;

pub use self::error::OperationError;
