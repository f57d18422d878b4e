use async_trait::async_trait;
use sqlx::PgConnection;

use crate::models::{InvoiceLine, LineItem, QuotationLine};

/// Storage for the line items of one kind of parent record.
///
/// Every call is scoped by `parent_id`: rows owned by another parent are
/// never returned, updated or deleted. Implementations run inside the
/// caller's transaction.
#[async_trait]
pub trait LineItemStore<F: Send + Sync + 'static>: Send {
    async fn list_children(&mut self, parent_id: i64) -> Result<Vec<LineItem<F>>, sqlx::Error>;

    async fn update(&mut self, item: &LineItem<F>) -> Result<(), sqlx::Error>;

    /// Returns the id assigned to the new row.
    async fn insert(&mut self, parent_id: i64, fields: &F) -> Result<i64, sqlx::Error>;

    async fn delete_many(&mut self, parent_id: i64, ids: &[i64]) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl LineItemStore<QuotationLine> for PgConnection {
    async fn list_children(
        &mut self,
        parent_id: i64,
    ) -> Result<Vec<LineItem<QuotationLine>>, sqlx::Error> {
        sqlx::query_as::<_, LineItem<QuotationLine>>(
            r#"
            SELECT id, quotation_id AS parent_id, sl_no, description, price
            FROM quotation_items
            WHERE quotation_id = $1
            ORDER BY sl_no, id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&mut *self)
        .await
    }

    async fn update(&mut self, item: &LineItem<QuotationLine>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE quotation_items
            SET sl_no = $1, description = $2, price = $3
            WHERE id = $4 AND quotation_id = $5
            "#,
        )
        .bind(item.fields.sl_no)
        .bind(&item.fields.description)
        .bind(&item.fields.price)
        .bind(item.id)
        .bind(item.parent_id)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn insert(&mut self, parent_id: i64, fields: &QuotationLine) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO quotation_items (quotation_id, sl_no, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(parent_id)
        .bind(fields.sl_no)
        .bind(&fields.description)
        .bind(&fields.price)
        .fetch_one(&mut *self)
        .await
    }

    async fn delete_many(&mut self, parent_id: i64, ids: &[i64]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quotation_items WHERE quotation_id = $1 AND id = ANY($2)")
            .bind(parent_id)
            .bind(ids)
            .execute(&mut *self)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LineItemStore<InvoiceLine> for PgConnection {
    async fn list_children(
        &mut self,
        parent_id: i64,
    ) -> Result<Vec<LineItem<InvoiceLine>>, sqlx::Error> {
        sqlx::query_as::<_, LineItem<InvoiceLine>>(
            r#"
            SELECT id, invoice_id AS parent_id, sl_no, description, quantity, rate, price
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY sl_no, id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&mut *self)
        .await
    }

    async fn update(&mut self, item: &LineItem<InvoiceLine>) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE invoice_items
            SET sl_no = $1, description = $2, quantity = $3, rate = $4, price = $5
            WHERE id = $6 AND invoice_id = $7
            "#,
        )
        .bind(item.fields.sl_no)
        .bind(&item.fields.description)
        .bind(item.fields.quantity)
        .bind(&item.fields.rate)
        .bind(&item.fields.price)
        .bind(item.id)
        .bind(item.parent_id)
        .execute(&mut *self)
        .await?;
        Ok(())
    }

    async fn insert(&mut self, parent_id: i64, fields: &InvoiceLine) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO invoice_items (invoice_id, sl_no, description, quantity, rate, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(parent_id)
        .bind(fields.sl_no)
        .bind(&fields.description)
        .bind(fields.quantity)
        .bind(&fields.rate)
        .bind(&fields.price)
        .fetch_one(&mut *self)
        .await
    }

    async fn delete_many(&mut self, parent_id: i64, ids: &[i64]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1 AND id = ANY($2)")
            .bind(parent_id)
            .bind(ids)
            .execute(&mut *self)
            .await?;
        Ok(result.rows_affected())
    }
}
