//! Persistence for accounts and installations

pub mod memory;
pub mod postgres;
pub mod settings;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::installation::{Account, Installation, InstallationUpdate, NewAccount};

/// Returned when a configuration id is already bound to another account
pub const INSTALLATION_OWNED_MESSAGE: &str = "Installation belongs to another account.";

/// Account and installation storage
///
/// Implementations only create, read and update; nothing is deleted and no
/// operation spans both tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert an account, or replace the token and team of the account with
    /// the same remote user id
    async fn upsert_account(&self, account: NewAccount) -> Result<Account, ServiceError>;

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, ServiceError>;

    /// Create a pending installation for the configuration id, or reset an
    /// existing one of the same account to pending
    ///
    /// An installation owned by another account is never reassigned; that
    /// case fails with a validation error.
    async fn create_installation(
        &self,
        account_id: Uuid,
        configuration_id: &str,
    ) -> Result<Installation, ServiceError>;

    async fn get_installation_by_configuration(
        &self,
        configuration_id: &str,
    ) -> Result<Option<Installation>, ServiceError>;

    async fn update_installation(
        &self,
        id: Uuid,
        update: InstallationUpdate,
    ) -> Result<Installation, ServiceError>;

    /// Release any held resources
    async fn close(&self) {}
}
