//! Inbound API models

pub mod models;
