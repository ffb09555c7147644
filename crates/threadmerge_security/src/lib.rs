//! Merge authorization and mergeability rules.
//!
//! Two config-driven layers sit in front of the merge engine:
//!
//! 1. **Permission Layer** - who may merge into which discussion
//! 2. **Validation Layer** - which post sets may be merged at all

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod permission;
mod validation;

pub use error::{SecurityError, SecurityErrorKind, SecurityResult};
pub use permission::{PermissionChecker, PermissionConfig};
pub use validation::{MergeValidator, ValidationConfig, ValidationError};
