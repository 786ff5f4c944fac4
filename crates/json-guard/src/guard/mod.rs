//! Write protection and guarded application of patch batches.

pub mod apply;
pub mod error;
pub mod validate;

pub use apply::{apply_guarded, ApplyOptions};
pub use error::{GuardError, InvalidPatch};
pub use validate::check_write_access;
