//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with store-assigned ids
//! - Case-insensitive SKU uniqueness (enforced by the schema)
//! - Manual stock correction
//!
//! Stock decrements from sales do NOT go through here; they happen inside
//! the settlement transaction (see [`crate::settlement`]).

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gestpro_core::validation::validate_stock;
use gestpro_core::{CoreError, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, category, selling_price_cents, purchase_price_cents,
           stock, sku, supplier_id, description, image_url
    FROM products
"#;

/// Row shape of the `products` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: String,
    name: String,
    category: String,
    selling_price_cents: i64,
    purchase_price_cents: i64,
    stock: i64,
    sku: String,
    supplier_id: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            selling_price_cents: row.selling_price_cents,
            purchase_price_cents: row.purchase_price_cents,
            stock: row.stock,
            sku: row.sku,
            supplier_id: row.supplier_id,
            description: row.description,
            image_url: row.image_url,
        }
    }
}

/// Inserts a product row exactly as given (id included).
///
/// Works on the pool or inside a transaction (`&mut *tx`).
pub(crate) async fn insert_row<'e, E>(executor: E, product: &Product) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, category, selling_price_cents, purchase_price_cents,
            stock, sku, supplier_id, description, image_url
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.selling_price_cents)
    .bind(product.purchase_price_cents)
    .bind(product.stock)
    .bind(&product.sku)
    .bind(&product.supplier_id)
    .bind(&product.description)
    .bind(&product.image_url)
    .execute(executor)
    .await
    .map_err(|e| DbError::from(e).with_duplicate_value(&product.sku))?;

    Ok(())
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let created = db.products().insert(&draft).await?;
/// db.products().set_stock(&created.id, 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!("{} ORDER BY name", SELECT_PRODUCT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_PRODUCT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    /// Gets a product by SKU, ignoring case.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("{} WHERE sku = ?1 COLLATE NOCASE", SELECT_PRODUCT))
                .bind(sku.trim())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Product::from))
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Creates a product. Whatever id the caller passed is replaced by a
    /// fresh UUID; the stored record is returned.
    ///
    /// ## Errors
    /// - `UniqueViolation { field: "sku", value }` if the SKU is taken
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        let mut stored = product.clone();
        stored.id = Uuid::new_v4().to_string();
        stored.sku = stored.sku.trim().to_string();

        debug!(id = %stored.id, sku = %stored.sku, "Inserting product");
        insert_row(&self.pool, &stored).await?;
        Ok(stored)
    }

    /// Replaces every field of the product with the same id.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                selling_price_cents = ?4,
                purchase_price_cents = ?5,
                stock = ?6,
                sku = ?7,
                supplier_id = ?8,
                description = ?9,
                image_url = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.selling_price_cents)
        .bind(product.purchase_price_cents)
        .bind(product.stock)
        .bind(product.sku.trim())
        .bind(&product.supplier_id)
        .bind(&product.description)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&product.sku))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }
        Ok(())
    }

    /// Deletes a product. Past transactions keep their snapshot of it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Manual stock correction (inventory count, delivery).
    ///
    /// A plain update, not coordinated with in-flight sales.
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        validate_stock(stock).map_err(|e| DbError::CheckViolation(CoreError::from(e).to_string()))?;

        debug!(id = %id, stock = stock, "Setting stock");

        let result = sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Current stock of one product, `None` if it does not exist.
    pub async fn get_stock(&self, id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stock)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
