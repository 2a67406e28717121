//! `information_schema` introspection for the report facade.

use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// One column of the `leads` table as declared in the database.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
}

/// Returns the declared columns of the `leads` table in declaration order.
///
/// Consumed by debugging/introspection tooling and the dashboard's schema
/// endpoint; the ordinal ordering mirrors the persisted column contract.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn table_schema(pool: &PgPool) -> Result<Vec<ColumnInfo>, DbError> {
    let rows = sqlx::query_as::<_, ColumnInfo>(
        "SELECT column_name, data_type, is_nullable \
         FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind("leads")
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn schema_lists_lead_columns_in_declaration_order(pool: PgPool) {
        let columns = table_schema(&pool).await.expect("introspect");
        let names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "profile_name",
                "fans",
                "hearts",
                "videos",
                "platform",
                "email",
                "lead_stage",
                "contract_video_url",
                "created_at",
                "contract_shares",
                "contract_plays",
                "contract_comments",
                "updated_at",
            ]
        );

        let id = &columns[0];
        assert_eq!(id.data_type, "bigint");
        assert_eq!(id.is_nullable, "NO");
    }
}
