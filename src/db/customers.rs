use sqlx::PgConnection;

use crate::models::{Customer, CustomerInput};

const COLUMNS: &str = "id, name, phone_number, gstin, address, email, company_name, created_at";

pub async fn list(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Customer>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM customers
        WHERE $1::text IS NULL
           OR name ILIKE '%' || $1::text || '%'
           OR phone_number ILIKE '%' || $1::text || '%'
        ORDER BY name ASC
        "#
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(search)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<Customer>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
    sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, input: &CustomerInput) -> Result<Customer, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO customers (name, phone_number, gstin, address, email, company_name)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(&input.name)
        .bind(&input.phone_number)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.email)
        .bind(&input.company_name)
        .fetch_one(conn)
        .await
}

pub async fn update(
    conn: &mut PgConnection,
    id: i64,
    input: &CustomerInput,
) -> Result<Option<Customer>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE customers
        SET name = $1, phone_number = $2, gstin = $3, address = $4, email = $5, company_name = $6
        WHERE id = $7
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(&input.name)
        .bind(&input.phone_number)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.email)
        .bind(&input.company_name)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Delete a customer with its quotations, invoices and their items.
///
/// Run inside a transaction; children are removed before their parents.
pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    sqlx::query(
        "DELETE FROM quotation_items WHERE quotation_id IN (SELECT id FROM quotations WHERE customer_id = $1)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM quotations WHERE customer_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "DELETE FROM invoice_items WHERE invoice_id IN (SELECT id FROM invoices WHERE customer_id = $1)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM invoices WHERE customer_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
