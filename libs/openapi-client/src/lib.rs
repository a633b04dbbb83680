//! Outbound API models

pub mod models;
