use sqlx::PgConnection;

use crate::models::{InvoiceHeader, InvoiceLine, InvoiceRow, LineItem};

const SELECT_INVOICE: &str = r#"
    SELECT i.id, i.invoice_id, i.customer_id AS customer, i.date, i.status,
           i.final_amount, i.notes, i.gst_applied, i.gst_rate, i.created_at,
           c.name AS customer_name, c.address AS customer_address,
           c.email AS customer_email, c.gstin AS customer_gst,
           c.phone_number AS customer_phone
    FROM invoices i
    INNER JOIN customers c ON c.id = i.customer_id
"#;

/// List invoices, newest first, optionally filtered by invoice id or
/// customer name.
pub async fn list(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<InvoiceRow>, sqlx::Error> {
    let sql = format!(
        r#"{SELECT_INVOICE}
        WHERE $1::text IS NULL
           OR i.invoice_id ILIKE '%' || $1::text || '%'
           OR c.name ILIKE '%' || $1::text || '%'
        ORDER BY i.created_at DESC, i.id DESC
        "#
    );
    sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(search)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<InvoiceRow>, sqlx::Error> {
    let sql = format!("{SELECT_INVOICE} WHERE i.id = $1");
    sqlx::query_as::<_, InvoiceRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn find_header_for_update(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<InvoiceHeader>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceHeader>(
        r#"
        SELECT invoice_id, customer_id AS customer, date, status, final_amount,
               notes, gst_applied, gst_rate
        FROM invoices
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn items_for(
    conn: &mut PgConnection,
    invoice_ids: &[i64],
) -> Result<Vec<LineItem<InvoiceLine>>, sqlx::Error> {
    sqlx::query_as::<_, LineItem<InvoiceLine>>(
        r#"
        SELECT id, invoice_id AS parent_id, sl_no, description, quantity, rate, price
        FROM invoice_items
        WHERE invoice_id = ANY($1)
        ORDER BY invoice_id, sl_no, id
        "#,
    )
    .bind(invoice_ids)
    .fetch_all(conn)
    .await
}

pub async fn insert(conn: &mut PgConnection, header: &InvoiceHeader) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO invoices (invoice_id, customer_id, date, status, final_amount, notes, gst_applied, gst_rate)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(&header.invoice_id)
    .bind(header.customer)
    .bind(header.date)
    .bind(header.status.as_str())
    .bind(&header.final_amount)
    .bind(&header.notes)
    .bind(header.gst_applied)
    .bind(&header.gst_rate)
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut PgConnection, id: i64, header: &InvoiceHeader) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE invoices
        SET invoice_id = $1, customer_id = $2, date = $3, status = $4,
            final_amount = $5, notes = $6, gst_applied = $7, gst_rate = $8
        WHERE id = $9
        "#,
    )
    .bind(&header.invoice_id)
    .bind(header.customer)
    .bind(header.date)
    .bind(header.status.as_str())
    .bind(&header.final_amount)
    .bind(&header.notes)
    .bind(header.gst_applied)
    .bind(&header.gst_rate)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Delete an invoice and its items. Items go first.
pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
