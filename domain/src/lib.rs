//! Domain layer: third-party gateway clients and the error taxonomy the
//! calling layer maps to user-facing responses.

pub mod error;
pub mod gateway;

pub use error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
