use sqlx::PgPool;
use std::collections::HashMap;
use validator::Validate;

use super::reconcile::{reconcile, ForeignIdPolicy};
use crate::db::invoices;
use crate::error::{AppError, AppResult};
use crate::models::{
    InvoiceDetail, InvoiceInput, InvoiceLine, InvoicePatch, LineItem, ProposedLineItem,
};

/// Invoices and their line items. Writes are transactional like
/// `QuotationService`.
pub struct InvoiceService {
    pool: PgPool,
    policy: ForeignIdPolicy,
}

impl InvoiceService {
    pub fn new(pool: PgPool, policy: ForeignIdPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<InvoiceDetail>> {
        let mut conn = self.pool.acquire().await?;
        let rows = invoices::list(&mut conn, search).await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut items_by_invoice: HashMap<i64, Vec<LineItem<InvoiceLine>>> = HashMap::new();
        for item in invoices::items_for(&mut conn, &ids).await? {
            items_by_invoice.entry(item.parent_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_invoice.remove(&row.id).unwrap_or_default();
                InvoiceDetail { invoice: row, items }
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<InvoiceDetail> {
        let mut conn = self.pool.acquire().await?;
        let row = invoices::find(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("invoice", id))?;
        let items = invoices::items_for(&mut conn, &[id]).await?;
        Ok(InvoiceDetail { invoice: row, items })
    }

    /// Create an invoice. Every proposed item is inserted as new; ids sent
    /// by the caller are not carried over.
    pub async fn create(&self, input: InvoiceInput) -> AppResult<InvoiceDetail> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let id = invoices::insert(&mut tx, &input.header).await?;
        let items = input
            .items
            .into_iter()
            .map(|item| ProposedLineItem::new(item.fields))
            .collect();
        reconcile(&mut *tx, id, items, self.policy).await?;
        tx.commit().await?;

        tracing::info!("Invoice {} created (id {})", input.header.invoice_id, id);
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: InvoiceInput) -> AppResult<InvoiceDetail> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        invoices::find_header_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("invoice", id))?;
        invoices::update(&mut tx, id, &input.header).await?;
        reconcile(&mut *tx, id, input.items, self.policy).await?;
        tx.commit().await?;

        self.get(id).await
    }

    /// Merge the given fields onto the stored invoice. Items are only
    /// reconciled when the patch carries them.
    pub async fn patch(&self, id: i64, patch: InvoicePatch) -> AppResult<InvoiceDetail> {
        let mut tx = self.pool.begin().await?;
        let current = invoices::find_header_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("invoice", id))?;

        let (header, items) = patch.apply(current);
        header.validate()?;
        if let Some(items) = &items {
            for item in items {
                item.validate()?;
            }
        }

        invoices::update(&mut tx, id, &header).await?;
        if let Some(items) = items {
            reconcile(&mut *tx, id, items, self.policy).await?;
        }
        tx.commit().await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        if invoices::delete(&mut tx, id).await? == 0 {
            return Err(AppError::not_found("invoice", id));
        }
        tx.commit().await?;

        tracing::info!("Invoice {} deleted", id);
        Ok(())
    }
}
