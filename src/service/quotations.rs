use sqlx::PgPool;
use std::collections::HashMap;
use validator::Validate;

use super::reconcile::{reconcile, ForeignIdPolicy};
use crate::db::quotations;
use crate::error::{AppError, AppResult};
use crate::models::{
    LineItem, ProposedLineItem, QuotationDetail, QuotationInput, QuotationLine, QuotationPatch,
};

/// Quotations and their line items.
///
/// Every write runs in one transaction: the quotation row, then the
/// reconciled items. Nothing is committed if any step fails.
pub struct QuotationService {
    pool: PgPool,
    policy: ForeignIdPolicy,
}

impl QuotationService {
    pub fn new(pool: PgPool, policy: ForeignIdPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<QuotationDetail>> {
        let mut conn = self.pool.acquire().await?;
        let rows = quotations::list(&mut conn, search).await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut items_by_quotation: HashMap<i64, Vec<LineItem<QuotationLine>>> = HashMap::new();
        for item in quotations::items_for(&mut conn, &ids).await? {
            items_by_quotation.entry(item.parent_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_quotation.remove(&row.id).unwrap_or_default();
                QuotationDetail::new(row, items)
            })
            .collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<QuotationDetail> {
        let mut conn = self.pool.acquire().await?;
        let row = quotations::find(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("quotation", id))?;
        let items = quotations::items_for(&mut conn, &[id]).await?;
        Ok(QuotationDetail::new(row, items))
    }

    /// Create a quotation. Every proposed item is inserted as new; ids sent
    /// by the caller are not carried over.
    pub async fn create(&self, input: QuotationInput) -> AppResult<QuotationDetail> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        let id = quotations::insert(&mut tx, &input.header).await?;
        let items = input
            .items
            .into_iter()
            .map(|item| ProposedLineItem::new(item.fields))
            .collect();
        reconcile(&mut *tx, id, items, self.policy).await?;
        tx.commit().await?;

        tracing::info!("Quotation {} created (id {})", input.header.quotation_id, id);
        self.get(id).await
    }

    /// Replace the quotation's fields and reconcile its items.
    pub async fn update(&self, id: i64, input: QuotationInput) -> AppResult<QuotationDetail> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;
        quotations::find_header_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("quotation", id))?;
        quotations::update(&mut tx, id, &input.header).await?;
        reconcile(&mut *tx, id, input.items, self.policy).await?;
        tx.commit().await?;

        self.get(id).await
    }

    /// Merge the given fields onto the stored quotation. Items are only
    /// reconciled when the patch carries them.
    pub async fn patch(&self, id: i64, patch: QuotationPatch) -> AppResult<QuotationDetail> {
        let mut tx = self.pool.begin().await?;
        let current = quotations::find_header_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("quotation", id))?;

        let (header, items) = patch.apply(current);
        header.validate()?;
        if let Some(items) = &items {
            for item in items {
                item.validate()?;
            }
        }

        quotations::update(&mut tx, id, &header).await?;
        if let Some(items) = items {
            reconcile(&mut *tx, id, items, self.policy).await?;
        }
        tx.commit().await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        if quotations::delete(&mut tx, id).await? == 0 {
            return Err(AppError::not_found("quotation", id));
        }
        tx.commit().await?;

        tracing::info!("Quotation {} deleted", id);
        Ok(())
    }
}
