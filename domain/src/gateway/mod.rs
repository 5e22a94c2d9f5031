//! Gateway clients for third-party services.

pub mod oauth;
