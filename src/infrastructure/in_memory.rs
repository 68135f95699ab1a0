use crate::domain::ports::RentalStore;
use crate::domain::rental::{GameUnit, RentalPeriod, RentalRecord, RentalRow};
use crate::error::{RentalError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    catalogue: HashMap<String, GameUnit>,
    records: Vec<RentalRecord>,
    periods: Vec<RentalPeriod>,
}

impl Tables {
    fn max_index(&self) -> u32 {
        self.records.iter().map(|r| r.rental_index).max().unwrap_or(0)
    }

    fn game_for_index(&self, rental_index: u32) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.rental_index == rental_index)
            .map(|r| r.game_id.as_str())
    }

    fn open_count_for_game(&self, game_id: &str) -> usize {
        self.periods
            .iter()
            .filter(|p| p.is_open() && self.game_for_index(p.rental_index) == Some(game_id))
            .count()
    }
}

/// Thread-safe in-memory store holding the rental tables behind one
/// `RwLock`. Issuance takes the write lock for the whole read-then-insert
/// sequence, which gives the single-writer discipline the paired insert
/// needs.
#[derive(Default, Clone)]
pub struct InMemoryRentalStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RentalStore for InMemoryRentalStore {
    async fn seed_catalogue(&self, games: &[GameUnit]) -> Result<()> {
        let mut tables = self.tables.write().await;
        for game in games {
            tables.catalogue.insert(game.game_id.clone(), game.clone());
        }
        Ok(())
    }

    async fn game_exists(&self, game_id: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.catalogue.contains_key(game_id))
    }

    async fn load_batch(&self, rows: &[RentalRow]) -> Result<()> {
        let mut tables = self.tables.write().await;

        let mut incoming: Vec<u32> = Vec::with_capacity(rows.len());
        for row in rows {
            let index = row.record.rental_index;
            let exists = incoming.contains(&index)
                || tables.records.iter().any(|r| r.rental_index == index);
            if exists {
                return Err(RentalError::DuplicateIndex(index));
            }
            incoming.push(index);
        }

        for row in rows {
            tables.records.push(row.record.clone());
            tables.periods.push(row.period.clone());
        }
        Ok(())
    }

    async fn open_rentals_for_game(&self, game_id: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(tables.open_count_for_game(game_id))
    }

    async fn open_rentals_for_customer(&self, customer_id: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        let count = tables
            .periods
            .iter()
            .filter(|p| {
                p.is_open()
                    && tables
                        .records
                        .iter()
                        .any(|r| r.rental_index == p.rental_index && r.customer_id == customer_id)
            })
            .count();
        Ok(count)
    }

    async fn issue_rental(
        &self,
        customer_id: &str,
        game_id: &str,
        start_date: &str,
    ) -> Result<u32> {
        let mut tables = self.tables.write().await;

        // Re-validate under the write lock: the availability the caller saw
        // may be stale by the time issuance runs.
        if tables.open_count_for_game(game_id) > 0 {
            return Err(RentalError::Conflict(game_id.to_string()));
        }

        let rental_index = tables.max_index() + 1;
        tables.records.push(RentalRecord {
            rental_index,
            customer_id: customer_id.to_string(),
            game_id: game_id.to_string(),
        });
        tables.periods.push(RentalPeriod {
            rental_index,
            start_date: start_date.to_string(),
            end_date: None,
        });
        Ok(rental_index)
    }

    async fn close_open_periods(&self, game_id: &str, end_date: &str) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let indices: Vec<u32> = tables
            .records
            .iter()
            .filter(|r| r.game_id == game_id)
            .map(|r| r.rental_index)
            .collect();

        let mut closed = 0;
        for period in tables
            .periods
            .iter_mut()
            .filter(|p| p.is_open() && indices.contains(&p.rental_index))
        {
            period.end_date = Some(end_date.to_string());
            closed += 1;
        }
        Ok(closed)
    }

    async fn rental_history(&self, game_id: &str) -> Result<Vec<RentalRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<RentalRow> = tables
            .records
            .iter()
            .filter(|r| r.game_id == game_id)
            .filter_map(|record| {
                tables
                    .periods
                    .iter()
                    .find(|p| p.rental_index == record.rental_index)
                    .map(|period| RentalRow {
                        record: record.clone(),
                        period: period.clone(),
                    })
            })
            .collect();
        rows.sort_by_key(|row| row.record.rental_index);
        Ok(rows)
    }
}
