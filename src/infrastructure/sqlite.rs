use crate::domain::ports::RentalStore;
use crate::domain::rental::{GameUnit, RentalPeriod, RentalRecord, RentalRow};
use crate::error::{RentalError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Relational store backed by SQLite.
///
/// The pool is capped at a single connection, so every write — including the
/// read-then-insert issuance transaction — is serialized through one writer.
/// All statements are parameterized; external values never reach the SQL
/// text.
#[derive(Clone)]
pub struct SqliteRentalStore {
    pool: SqlitePool,
}

impl SqliteRentalStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options).await
    }

    /// A private in-memory database, used by tests.
    pub async fn in_memory() -> Result<Self> {
        Self::with_options(SqliteConnectOptions::new().filename(":memory:")).await
    }

    async fn with_options(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                game_id        TEXT PRIMARY KEY,
                title          TEXT NOT NULL,
                platform       TEXT NOT NULL,
                genre          TEXT NOT NULL,
                purchase_price TEXT NOT NULL,
                purchase_date  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS game_rentals (
                rental_index INTEGER PRIMARY KEY,
                customer_id  TEXT NOT NULL,
                game_id      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rental_periods (
                rental_index INTEGER PRIMARY KEY REFERENCES game_rentals (rental_index),
                start_date   TEXT NOT NULL,
                end_date     TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct JoinedRow {
    rental_index: i64,
    customer_id: String,
    game_id: String,
    start_date: String,
    end_date: Option<String>,
}

impl From<JoinedRow> for RentalRow {
    fn from(row: JoinedRow) -> Self {
        let rental_index = row.rental_index as u32;
        Self {
            record: RentalRecord {
                rental_index,
                customer_id: row.customer_id,
                game_id: row.game_id,
            },
            period: RentalPeriod {
                rental_index,
                start_date: row.start_date,
                end_date: row.end_date,
            },
        }
    }
}

#[async_trait]
impl RentalStore for SqliteRentalStore {
    async fn seed_catalogue(&self, games: &[GameUnit]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for game in games {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO games
                    (game_id, title, platform, genre, purchase_price, purchase_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&game.game_id)
            .bind(&game.title)
            .bind(&game.platform)
            .bind(&game.genre)
            .bind(game.purchase_price.to_string())
            .bind(&game.purchase_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn game_exists(&self, game_id: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM games WHERE game_id = ?1")
                .bind(game_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn load_batch(&self, rows: &[RentalRow]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let index = row.record.rental_index;
            let present: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM game_rentals WHERE rental_index = ?1",
            )
            .bind(i64::from(index))
            .fetch_one(&mut *tx)
            .await?;
            if present > 0 {
                return Err(RentalError::DuplicateIndex(index));
            }

            sqlx::query(
                "INSERT INTO game_rentals (rental_index, customer_id, game_id) VALUES (?1, ?2, ?3)",
            )
            .bind(i64::from(index))
            .bind(&row.record.customer_id)
            .bind(&row.record.game_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "INSERT INTO rental_periods (rental_index, start_date, end_date) VALUES (?1, ?2, ?3)",
            )
            .bind(i64::from(index))
            .bind(&row.period.start_date)
            .bind(&row.period.end_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn open_rentals_for_game(&self, game_id: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM rental_periods AS rp
            INNER JOIN game_rentals AS gr ON gr.rental_index = rp.rental_index
            WHERE gr.game_id = ?1
              AND (rp.end_date IS NULL OR rp.end_date = '')
            "#,
        )
        .bind(game_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as usize)
    }

    async fn open_rentals_for_customer(&self, customer_id: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM rental_periods AS rp
            INNER JOIN game_rentals AS gr ON gr.rental_index = rp.rental_index
            WHERE gr.customer_id = ?1
              AND (rp.end_date IS NULL OR rp.end_date = '')
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as usize)
    }

    async fn issue_rental(
        &self,
        customer_id: &str,
        game_id: &str,
        start_date: &str,
    ) -> Result<u32> {
        let mut tx = self.pool.begin().await?;

        // Re-validate availability inside the transaction; the caller's
        // check may be stale.
        let open: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM rental_periods AS rp
            INNER JOIN game_rentals AS gr ON gr.rental_index = rp.rental_index
            WHERE gr.game_id = ?1
              AND (rp.end_date IS NULL OR rp.end_date = '')
            "#,
        )
        .bind(game_id)
        .fetch_one(&mut *tx)
        .await?;
        if open > 0 {
            return Err(RentalError::Conflict(game_id.to_string()));
        }

        let max_index: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(rental_index), 0) FROM game_rentals")
                .fetch_one(&mut *tx)
                .await?;
        let rental_index = max_index + 1;

        sqlx::query(
            "INSERT INTO game_rentals (rental_index, customer_id, game_id) VALUES (?1, ?2, ?3)",
        )
        .bind(rental_index)
        .bind(customer_id)
        .bind(game_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO rental_periods (rental_index, start_date, end_date) VALUES (?1, ?2, NULL)",
        )
        .bind(rental_index)
        .bind(start_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rental_index as u32)
    }

    async fn close_open_periods(&self, game_id: &str, end_date: &str) -> Result<usize> {
        let result = sqlx::query(
            r#"
            UPDATE rental_periods
            SET end_date = ?1
            WHERE rental_index IN (
                SELECT rental_index FROM game_rentals WHERE game_id = ?2
            )
              AND (end_date IS NULL OR end_date = '')
            "#,
        )
        .bind(end_date)
        .bind(game_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() as usize)
    }

    async fn rental_history(&self, game_id: &str) -> Result<Vec<RentalRow>> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            r#"
            SELECT
                gr.rental_index,
                gr.customer_id,
                gr.game_id,
                rp.start_date,
                rp.end_date
            FROM game_rentals AS gr
            INNER JOIN rental_periods AS rp ON rp.rental_index = gr.rental_index
            WHERE gr.game_id = ?1
            ORDER BY gr.rental_index
            "#,
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RentalRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(index: u32, game: &str, customer: &str, end: Option<&str>) -> RentalRow {
        RentalRow {
            record: RentalRecord {
                rental_index: index,
                customer_id: customer.to_string(),
                game_id: game.to_string(),
            },
            period: RentalPeriod {
                rental_index: index,
                start_date: "01-02-2021".to_string(),
                end_date: end.map(str::to_string),
            },
        }
    }

    #[tokio::test]
    async fn test_schema_and_catalogue() {
        let store = SqliteRentalStore::in_memory().await.unwrap();
        assert!(!store.game_exists("50").await.unwrap());

        store
            .seed_catalogue(&[GameUnit {
                game_id: "50".to_string(),
                title: "Outrun".to_string(),
                platform: "Mega Drive".to_string(),
                genre: "Racing".to_string(),
                purchase_price: dec!(39.99),
                purchase_date: "01-06-2020".to_string(),
            }])
            .await
            .unwrap();
        assert!(store.game_exists("50").await.unwrap());
    }

    #[tokio::test]
    async fn test_load_batch_counts_and_history() {
        let store = SqliteRentalStore::in_memory().await.unwrap();
        store
            .load_batch(&[
                row(1, "50", "9967", Some("05-02-2021")),
                row(2, "50", "4411", None),
                row(3, "51", "9967", None),
            ])
            .await
            .unwrap();

        assert_eq!(store.open_rentals_for_game("50").await.unwrap(), 1);
        assert_eq!(store.open_rentals_for_customer("9967").await.unwrap(), 1);

        let history = store.rental_history("50").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].record.rental_index, 1);
        assert!(!history[0].period.is_open());
        assert!(history[1].period.is_open());
    }

    #[tokio::test]
    async fn test_load_batch_rejects_duplicate_index_atomically() {
        let store = SqliteRentalStore::in_memory().await.unwrap();
        store.load_batch(&[row(1, "50", "9967", None)]).await.unwrap();

        let result = store
            .load_batch(&[row(5, "52", "9967", None), row(1, "51", "4411", None)])
            .await;
        assert!(matches!(result, Err(RentalError::DuplicateIndex(1))));
        // The whole batch rolled back, including the non-conflicting row.
        assert!(store.rental_history("52").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_issue_assigns_next_index() {
        let store = SqliteRentalStore::in_memory().await.unwrap();
        store
            .load_batch(&[row(7, "50", "9967", Some("05-02-2021"))])
            .await
            .unwrap();

        let index = store.issue_rental("4411", "51", "06-02-2021").await.unwrap();
        assert_eq!(index, 8);

        let history = store.rental_history("51").await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].period.is_open());
    }

    #[tokio::test]
    async fn test_issue_conflicts_when_game_already_out() {
        let store = SqliteRentalStore::in_memory().await.unwrap();
        store.issue_rental("9967", "50", "01-02-2021").await.unwrap();

        let result = store.issue_rental("4411", "50", "01-02-2021").await;
        assert!(matches!(result, Err(RentalError::Conflict(_))));
        assert_eq!(store.rental_history("50").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_open_periods_bulk() {
        let store = SqliteRentalStore::in_memory().await.unwrap();
        store
            .load_batch(&[
                row(1, "50", "9967", None),
                row(2, "50", "4411", None),
                row(3, "51", "9967", None),
            ])
            .await
            .unwrap();

        let closed = store.close_open_periods("50", "10-02-2021").await.unwrap();
        assert_eq!(closed, 2);
        assert_eq!(store.open_rentals_for_game("50").await.unwrap(), 0);
        assert_eq!(store.open_rentals_for_game("51").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rental.db");

        {
            let store = SqliteRentalStore::open(&path).await.unwrap();
            store.issue_rental("9967", "50", "01-02-2021").await.unwrap();
        }

        let store = SqliteRentalStore::open(&path).await.unwrap();
        assert_eq!(store.open_rentals_for_game("50").await.unwrap(), 1);
        let index = store.issue_rental("9967", "51", "02-02-2021").await.unwrap();
        assert_eq!(index, 2);
    }
}
