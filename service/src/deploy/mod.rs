//! Deployment orchestration

pub mod trigger;
