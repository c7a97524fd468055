use playtest_core::model::{LuminariasTransaction, TransactionKind, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_transaction_row, metadata_to_json};
use crate::repository::{LuminariasRepository, StorageError, TransactionRow};

const BALANCE_SQL: &str = r"
    SELECT COALESCE(SUM(CASE kind WHEN 'earn' THEN amount ELSE -amount END), 0)
    FROM luminarias_transactions
    WHERE user_id = ?1
";

#[async_trait::async_trait]
impl LuminariasRepository for SqliteRepository {
    async fn balance(&self, user_id: UserId) -> Result<i64, StorageError> {
        sqlx::query_scalar::<_, i64>(BALANCE_SQL)
            .bind(id_i64("user_id", user_id.value())?)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)
    }

    async fn append_transaction(&self, tx: &LuminariasTransaction) -> Result<i64, StorageError> {
        let user_id = id_i64("user_id", tx.user_id().value())?;
        let metadata = metadata_to_json(tx)?;

        let mut db_tx = self.pool.begin().await.map_err(conn)?;

        if tx.kind() == TransactionKind::Spend {
            let balance: i64 = sqlx::query_scalar(BALANCE_SQL)
                .bind(user_id)
                .fetch_one(&mut *db_tx)
                .await
                .map_err(conn)?;
            if balance < i64::from(tx.amount()) {
                return Err(StorageError::InsufficientBalance {
                    balance,
                    requested: tx.amount(),
                });
            }
        }

        let res = sqlx::query(
            r"
            INSERT INTO luminarias_transactions (
                user_id, kind, amount, category, subcategory,
                action_type, description, metadata, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(user_id)
        .bind(tx.kind().as_str())
        .bind(i64::from(tx.amount()))
        .bind(tx.category())
        .bind(tx.subcategory())
        .bind(tx.action_type())
        .bind(tx.description())
        .bind(metadata)
        .bind(tx.created_at())
        .execute(&mut *db_tx)
        .await
        .map_err(conn)?;

        db_tx.commit().await.map_err(conn)?;
        Ok(res.last_insert_rowid())
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<TransactionRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, user_id, kind, amount, category, subcategory,
                action_type, description, metadata, created_at
            FROM luminarias_transactions
            WHERE user_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_transaction_row(&row)?);
        }
        Ok(out)
    }
}
