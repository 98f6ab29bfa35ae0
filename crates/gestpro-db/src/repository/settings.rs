//! # Store Settings Repository
//!
//! The `store_settings` table holds at most one row (`id = 1`). Its presence
//! is what marks the store as initialized.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use gestpro_core::{StoreSettings, StoreStatus};

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    name: String,
    address: String,
    city: String,
    phone: String,
    email: String,
    logo_url: Option<String>,
    receipt_footer: String,
}

impl From<SettingsRow> for StoreSettings {
    fn from(row: SettingsRow) -> Self {
        StoreSettings {
            name: row.name,
            address: row.address,
            city: row.city,
            phone: row.phone,
            email: row.email,
            logo_url: row.logo_url,
            receipt_footer: row.receipt_footer,
        }
    }
}

/// Writes the singleton row, replacing any previous one.
pub(crate) async fn upsert_row<'e, E>(executor: E, settings: &StoreSettings) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO store_settings (id, name, address, city, phone, email, logo_url, receipt_footer)
        VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            address = excluded.address,
            city = excluded.city,
            phone = excluded.phone,
            email = excluded.email,
            logo_url = excluded.logo_url,
            receipt_footer = excluded.receipt_footer
        "#,
    )
    .bind(&settings.name)
    .bind(&settings.address)
    .bind(&settings.city)
    .bind(&settings.phone)
    .bind(&settings.email)
    .bind(&settings.logo_url)
    .bind(&settings.receipt_footer)
    .execute(executor)
    .await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// The stored settings, `None` before initialization.
    pub async fn get(&self) -> DbResult<Option<StoreSettings>> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r#"
            SELECT name, address, city, phone, email, logo_url, receipt_footer
            FROM store_settings WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoreSettings::from))
    }

    pub async fn upsert(&self, settings: &StoreSettings) -> DbResult<()> {
        debug!(name = %settings.name, "Saving store settings");
        upsert_row(&self.pool, settings).await
    }

    pub async fn status(&self) -> DbResult<StoreStatus> {
        let present: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store_settings")
            .fetch_one(&self.pool)
            .await?;
        Ok(if present > 0 {
            StoreStatus::Ready
        } else {
            StoreStatus::NeedsInitialization
        })
    }
}
