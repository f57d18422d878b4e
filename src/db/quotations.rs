use sqlx::PgConnection;

use crate::models::{LineItem, QuotationHeader, QuotationLine, QuotationRow};

const SELECT_QUOTATION: &str = r#"
    SELECT q.id, q.quotation_id, q.customer_id AS customer, q.date,
           q.gst_applied, q.gst_rate, q.notes, q.status, q.created_at,
           c.name AS customer_name, c.address AS customer_address,
           c.email AS customer_mail, c.gstin AS customer_gst,
           c.phone_number AS customer_phone
    FROM quotations q
    INNER JOIN customers c ON c.id = q.customer_id
"#;

/// List quotations, newest first, optionally filtered by quotation id or
/// customer name.
pub async fn list(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<QuotationRow>, sqlx::Error> {
    let sql = format!(
        r#"{SELECT_QUOTATION}
        WHERE $1::text IS NULL
           OR q.quotation_id ILIKE '%' || $1::text || '%'
           OR c.name ILIKE '%' || $1::text || '%'
        ORDER BY q.created_at DESC, q.id DESC
        "#
    );
    sqlx::query_as::<_, QuotationRow>(&sql)
        .bind(search)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<QuotationRow>, sqlx::Error> {
    let sql = format!("{SELECT_QUOTATION} WHERE q.id = $1");
    sqlx::query_as::<_, QuotationRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Lock the quotation row for the rest of the transaction.
pub async fn find_header_for_update(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<QuotationHeader>, sqlx::Error> {
    sqlx::query_as::<_, QuotationHeader>(
        r#"
        SELECT quotation_id, customer_id AS customer, date, gst_applied,
               gst_rate, notes, status
        FROM quotations
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Items of several quotations at once, for list responses.
pub async fn items_for(
    conn: &mut PgConnection,
    quotation_ids: &[i64],
) -> Result<Vec<LineItem<QuotationLine>>, sqlx::Error> {
    sqlx::query_as::<_, LineItem<QuotationLine>>(
        r#"
        SELECT id, quotation_id AS parent_id, sl_no, description, price
        FROM quotation_items
        WHERE quotation_id = ANY($1)
        ORDER BY quotation_id, sl_no, id
        "#,
    )
    .bind(quotation_ids)
    .fetch_all(conn)
    .await
}

pub async fn insert(conn: &mut PgConnection, header: &QuotationHeader) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO quotations (quotation_id, customer_id, date, gst_applied, gst_rate, notes, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&header.quotation_id)
    .bind(header.customer)
    .bind(header.date)
    .bind(header.gst_applied)
    .bind(&header.gst_rate)
    .bind(&header.notes)
    .bind(header.status.as_str())
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut PgConnection, id: i64, header: &QuotationHeader) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE quotations
        SET quotation_id = $1, customer_id = $2, date = $3, gst_applied = $4,
            gst_rate = $5, notes = $6, status = $7
        WHERE id = $8
        "#,
    )
    .bind(&header.quotation_id)
    .bind(header.customer)
    .bind(header.date)
    .bind(header.gst_applied)
    .bind(&header.gst_rate)
    .bind(&header.notes)
    .bind(header.status.as_str())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a quotation and its items. Items go first.
pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM quotation_items WHERE quotation_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM quotations WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
