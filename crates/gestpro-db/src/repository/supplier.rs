//! # Supplier Repository
//!
//! Deleting a supplier never touches products: their `supplier_id` is left
//! dangling and resolves to the "unknown" label at read time.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gestpro_core::Supplier;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SupplierRow {
    id: String,
    name: String,
    contact_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact_name: row.contact_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

pub(crate) async fn insert_row<'e, E>(executor: E, supplier: &Supplier) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO suppliers (id, name, contact_name, email, phone) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&supplier.id)
    .bind(&supplier.name)
    .bind(&supplier.contact_name)
    .bind(&supplier.email)
    .bind(&supplier.phone)
    .execute(executor)
    .await
    .map_err(|e| DbError::from(e).with_duplicate_value(&supplier.id))?;
    Ok(())
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn list_all(&self) -> DbResult<Vec<Supplier>> {
        let rows: Vec<SupplierRow> = sqlx::query_as(
            "SELECT id, name, contact_name, email, phone FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let row: Option<SupplierRow> = sqlx::query_as(
            "SELECT id, name, contact_name, email, phone FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Supplier::from))
    }

    /// Creates a supplier under a fresh UUID and returns the stored record.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        let mut stored = supplier.clone();
        stored.id = Uuid::new_v4().to_string();

        debug!(id = %stored.id, name = %stored.name, "Inserting supplier");
        insert_row(&self.pool, &stored).await?;
        Ok(stored)
    }

    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, "Updating supplier");

        let result = sqlx::query(
            "UPDATE suppliers SET name = ?2, contact_name = ?3, email = ?4, phone = ?5 WHERE id = ?1",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use gestpro_core::{Product, Supplier};

    #[tokio::test]
    async fn test_delete_supplier_keeps_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db
            .suppliers()
            .insert(&Supplier {
                id: String::new(),
                name: "Home Essentials".to_string(),
                contact_name: Some("Mike Ross".to_string()),
                email: None,
                phone: None,
            })
            .await
            .unwrap();

        let product = db
            .products()
            .insert(&Product {
                id: String::new(),
                name: "Coffee Maker".to_string(),
                category: "Home".to_string(),
                selling_price_cents: 8999,
                purchase_price_cents: 5500,
                stock: 15,
                sku: "HM-004".to_string(),
                supplier_id: Some(supplier.id.clone()),
                description: None,
                image_url: None,
            })
            .await
            .unwrap();

        db.suppliers().delete(&supplier.id).await.unwrap();

        let kept = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(kept.supplier_id, Some(supplier.id));
        assert!(db.suppliers().list_all().await.unwrap().is_empty());
    }
}
