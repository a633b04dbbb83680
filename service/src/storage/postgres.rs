//! PostgreSQL store
//!
//! Expects the tables described in `sql/schema.sql`.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::installation::{
    Account, Installation, InstallationStatus, InstallationUpdate, NewAccount,
};
use crate::storage::{Store, INSTALLATION_OWNED_MESSAGE};

const ACCOUNT_COLUMNS: &str =
    "id, remote_user_id, team_id, access_token, created_at, updated_at";

const INSTALLATION_COLUMNS: &str = "id, account_id, configuration_id, status, project_id, \
     project_name, deployment_id, deployment_url, created_at, updated_at";

/// Store backed by a PostgreSQL connection pool
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to the database
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ServiceError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected to database (max {} connections)", max_connections);
        Ok(Self { pool })
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, ServiceError> {
    Ok(Account {
        id: row.try_get("id")?,
        remote_user_id: row.try_get("remote_user_id")?,
        team_id: row.try_get("team_id")?,
        access_token: row.try_get("access_token")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn installation_from_row(row: &PgRow) -> Result<Installation, ServiceError> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<InstallationStatus>()
        .map_err(ServiceError::Internal)?;

    Ok(Installation {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        configuration_id: row.try_get("configuration_id")?,
        status,
        project_id: row.try_get("project_id")?,
        project_name: row.try_get("project_name")?,
        deployment_id: row.try_get("deployment_id")?,
        deployment_url: row.try_get("deployment_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl Store for PostgresStore {
    async fn upsert_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let sql = format!(
            r#"
            INSERT INTO accounts (id, remote_user_id, team_id, access_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (remote_user_id) DO UPDATE
            SET team_id = EXCLUDED.team_id,
                access_token = EXCLUDED.access_token,
                updated_at = NOW()
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&account.remote_user_id)
            .bind(&account.team_id)
            .bind(&account.access_token)
            .fetch_one(&self.pool)
            .await?;

        account_from_row(&row)
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>, ServiceError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn create_installation(
        &self,
        account_id: Uuid,
        configuration_id: &str,
    ) -> Result<Installation, ServiceError> {
        let sql = format!(
            r#"
            INSERT INTO installations (id, account_id, configuration_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (configuration_id) DO UPDATE
            SET status = EXCLUDED.status,
                updated_at = NOW()
            WHERE installations.account_id = EXCLUDED.account_id
            RETURNING {INSTALLATION_COLUMNS}
            "#
        );
        // No row comes back when the conflicting installation has another owner
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(account_id)
            .bind(configuration_id)
            .bind(InstallationStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::validation(INSTALLATION_OWNED_MESSAGE))?;

        installation_from_row(&row)
    }

    async fn get_installation_by_configuration(
        &self,
        configuration_id: &str,
    ) -> Result<Option<Installation>, ServiceError> {
        let sql = format!(
            "SELECT {INSTALLATION_COLUMNS} FROM installations WHERE configuration_id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(configuration_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(installation_from_row).transpose()
    }

    async fn update_installation(
        &self,
        id: Uuid,
        update: InstallationUpdate,
    ) -> Result<Installation, ServiceError> {
        let sql = format!(
            r#"
            UPDATE installations
            SET status = COALESCE($2, status),
                project_id = COALESCE($3, project_id),
                project_name = COALESCE($4, project_name),
                deployment_id = COALESCE($5, deployment_id),
                deployment_url = COALESCE($6, deployment_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INSTALLATION_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(update.status.map(|s| s.as_str()))
            .bind(update.project_id)
            .bind(update.project_name)
            .bind(update.deployment_id)
            .bind(update.deployment_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Installation not found.".to_string()))?;

        installation_from_row(&row)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
