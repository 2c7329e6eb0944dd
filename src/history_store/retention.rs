// Retention: keep only the newest `ceiling` summaries. Runs on the insert transaction.

use sqlx::SqliteConnection;

/// Upper bound on stored summaries; `database.retention_limit` may only lower it.
pub const RETENTION_CEILING: u32 = 5;

/// Delete every summary except the newest `ceiling` (by uploaded_at, then id).
/// Returns the number of rows removed.
pub(super) async fn evict_oldest_beyond(
    conn: &mut SqliteConnection,
    ceiling: u32,
) -> Result<u64, sqlx::Error> {
    let r = sqlx::query(
        "DELETE FROM summaries WHERE id NOT IN (
             SELECT id FROM summaries ORDER BY uploaded_at DESC, id DESC LIMIT $1
         )",
    )
    .bind(ceiling as i64)
    .execute(&mut *conn)
    .await?;
    Ok(r.rows_affected())
}

pub(super) async fn stored_count(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM summaries")
        .fetch_one(&mut *conn)
        .await?;
    Ok(n as u64)
}
