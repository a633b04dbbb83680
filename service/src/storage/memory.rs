//! In-memory store for local runs and tests

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::installation::{
    Account, Installation, InstallationStatus, InstallationUpdate, NewAccount,
};
use crate::storage::{Store, INSTALLATION_OWNED_MESSAGE};

/// Process-local store; contents are lost on exit
#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
    installations: RwLock<HashMap<Uuid, Installation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub fn account_count(&self) -> usize {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        accounts.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        if let Some(existing) = accounts
            .values_mut()
            .find(|a| a.remote_user_id == account.remote_user_id)
        {
            existing.team_id = account.team_id;
            existing.access_token = account.access_token;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = Account {
            id: Uuid::new_v4(),
            remote_user_id: account.remote_user_id,
            team_id: account.team_id,
            access_token: account.access_token,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, ServiceError> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        Ok(accounts.get(&id).cloned())
    }

    async fn create_installation(
        &self,
        account_id: Uuid,
        configuration_id: &str,
    ) -> Result<Installation, ServiceError> {
        let mut installations = self.installations.write().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        if let Some(existing) = installations
            .values_mut()
            .find(|i| i.configuration_id == configuration_id)
        {
            if existing.account_id != account_id {
                return Err(ServiceError::validation(INSTALLATION_OWNED_MESSAGE));
            }
            existing.status = InstallationStatus::Pending;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = Installation {
            id: Uuid::new_v4(),
            account_id,
            configuration_id: configuration_id.to_string(),
            status: InstallationStatus::Pending,
            project_id: None,
            project_name: None,
            deployment_id: None,
            deployment_url: None,
            created_at: now,
            updated_at: now,
        };
        installations.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_installation_by_configuration(
        &self,
        configuration_id: &str,
    ) -> Result<Option<Installation>, ServiceError> {
        let installations = self.installations.read().unwrap_or_else(|e| e.into_inner());
        Ok(installations
            .values()
            .find(|i| i.configuration_id == configuration_id)
            .cloned())
    }

    async fn update_installation(
        &self,
        id: Uuid,
        update: InstallationUpdate,
    ) -> Result<Installation, ServiceError> {
        let mut installations = self.installations.write().unwrap_or_else(|e| e.into_inner());
        let installation = installations
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound("Installation not found.".to_string()))?;
        update.apply(installation);
        Ok(installation.clone())
    }
}
