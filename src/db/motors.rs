use sqlx::types::Json;
use sqlx::PgConnection;

use crate::models::{Motor, MotorInput};

const COLUMNS: &str = r#"
    id, name, description, motor_type, power_rating, voltage, winding_type,
    coil_count, wire_gauge, pitch_details, turns_per_coil, winding_data,
    rewinding_notes, created_at
"#;

/// List motors, newest first, optionally filtered by name, power rating or
/// motor type.
pub async fn list(conn: &mut PgConnection, search: Option<&str>) -> Result<Vec<Motor>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM motors
        WHERE $1::text IS NULL
           OR name ILIKE '%' || $1::text || '%'
           OR power_rating ILIKE '%' || $1::text || '%'
           OR motor_type ILIKE '%' || $1::text || '%'
        ORDER BY created_at DESC, id DESC
        "#
    );
    sqlx::query_as::<_, Motor>(&sql)
        .bind(search)
        .fetch_all(conn)
        .await
}

pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<Motor>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM motors WHERE id = $1");
    sqlx::query_as::<_, Motor>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn insert(conn: &mut PgConnection, input: &MotorInput) -> Result<Motor, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO motors (name, description, motor_type, power_rating, voltage, winding_type,
                            coil_count, wire_gauge, pitch_details, turns_per_coil, winding_data,
                            rewinding_notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, Motor>(&sql)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.motor_type.as_str())
        .bind(&input.power_rating)
        .bind(&input.voltage)
        .bind(&input.winding_type)
        .bind(&input.coil_count)
        .bind(&input.wire_gauge)
        .bind(&input.pitch_details)
        .bind(&input.turns_per_coil)
        .bind(Json(&input.winding_data))
        .bind(&input.rewinding_notes)
        .fetch_one(conn)
        .await
}

pub async fn update(conn: &mut PgConnection, id: i64, input: &MotorInput) -> Result<Option<Motor>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE motors
        SET name = $1, description = $2, motor_type = $3, power_rating = $4, voltage = $5,
            winding_type = $6, coil_count = $7, wire_gauge = $8, pitch_details = $9,
            turns_per_coil = $10, winding_data = $11, rewinding_notes = $12
        WHERE id = $13
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, Motor>(&sql)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.motor_type.as_str())
        .bind(&input.power_rating)
        .bind(&input.voltage)
        .bind(&input.winding_type)
        .bind(&input.coil_count)
        .bind(&input.wire_gauge)
        .bind(&input.pitch_details)
        .bind(&input.turns_per_coil)
        .bind(Json(&input.winding_data))
        .bind(&input.rewinding_notes)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM motors WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
