//! Launchpad Library
//!
//! OAuth integration and deployment trigger service: connects a deployment
//! platform account, stores its token encrypted, and deploys the template
//! repository with the user's credentials as environment variables.

pub mod app;
pub mod authn;
pub mod deploy;
pub mod errors;
pub mod http;
pub mod installer;
pub mod logs;
pub mod models;
pub mod server;
pub mod storage;
pub mod utils;
