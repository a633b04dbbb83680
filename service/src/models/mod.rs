//! Persisted records

pub mod installation;
