//! Record Validation
//!
//! Field-level validation for student and mark payloads, checked before
//! anything is written to the record store.

mod email;
mod error;
mod validator;

pub use email::{is_email_like, normalize_email};
pub use error::{ValidationError, ValidationErrors};
pub use validator::{MarkDraft, StudentDraft};
