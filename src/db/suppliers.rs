use sqlx::PgConnection;

use crate::models::{Supplier, SupplierInput};

const COLUMNS: &str = "id, name, company_name, gstin, address, phone_number, created_at";

pub async fn list(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Supplier>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM suppliers
        WHERE $1::text IS NULL
           OR name ILIKE '%' || $1::text || '%'
           OR phone_number ILIKE '%' || $1::text || '%'
        ORDER BY name ASC
        "#
    );
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(search)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<Supplier>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM suppliers WHERE id = $1");
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, input: &SupplierInput) -> Result<Supplier, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO suppliers (name, company_name, gstin, address, phone_number)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(&input.name)
        .bind(&input.company_name)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.phone_number)
        .fetch_one(conn)
        .await
}

pub async fn update(
    conn: &mut PgConnection,
    id: i64,
    input: &SupplierInput,
) -> Result<Option<Supplier>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE suppliers
        SET name = $1, company_name = $2, gstin = $3, address = $4, phone_number = $5
        WHERE id = $6
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(&input.name)
        .bind(&input.company_name)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Delete a supplier and the goods received from it.
pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM incoming_goods WHERE supplier_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
