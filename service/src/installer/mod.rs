//! OAuth installation

pub mod install;
