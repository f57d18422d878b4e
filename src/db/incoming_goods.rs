use sqlx::PgConnection;

use crate::models::{IncomingGood, IncomingGoodInput};

const SELECT_GOOD: &str = r#"
    SELECT g.id, g.supplier_id AS supplier, s.name AS supplier_name, g.date,
           g.item_name, g.quantity, g.price, g.created_at
    FROM incoming_goods g
    INNER JOIN suppliers s ON s.id = g.supplier_id
"#;

/// List received goods, latest delivery first, optionally filtered by item
/// or supplier name.
pub async fn list(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<IncomingGood>, sqlx::Error> {
    let sql = format!(
        r#"{SELECT_GOOD}
        WHERE $1::text IS NULL
           OR g.item_name ILIKE '%' || $1::text || '%'
           OR s.name ILIKE '%' || $1::text || '%'
        ORDER BY g.date DESC, g.id DESC
        "#
    );
    sqlx::query_as::<_, IncomingGood>(&sql)
        .bind(search)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<IncomingGood>, sqlx::Error> {
    let sql = format!("{SELECT_GOOD} WHERE g.id = $1");
    sqlx::query_as::<_, IncomingGood>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, input: &IncomingGoodInput) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO incoming_goods (supplier_id, date, item_name, quantity, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(input.supplier)
    .bind(input.date)
    .bind(&input.item_name)
    .bind(&input.quantity)
    .bind(&input.price)
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut PgConnection, id: i64, input: &IncomingGoodInput) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE incoming_goods
        SET supplier_id = $1, date = $2, item_name = $3, quantity = $4, price = $5
        WHERE id = $6
        "#,
    )
    .bind(input.supplier)
    .bind(input.date)
    .bind(&input.item_name)
    .bind(&input.quantity)
    .bind(&input.price)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM incoming_goods WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
