//! Service level tests against mocked upstream APIs

mod test_env_vars;
mod test_routes;
