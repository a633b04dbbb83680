//! Outbound HTTP clients

pub mod client;
pub mod env_vars;
pub mod errors;
pub mod platform;
pub mod source;
