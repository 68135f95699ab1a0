use super::rental::{GameUnit, RentalRow};
use crate::error::Result;
use async_trait::async_trait;

pub type RentalStoreBox = Box<dyn RentalStore>;

/// Storage port for the rental tables and the game catalogue.
///
/// Adapters must keep the paired-row invariant: a rental record and its period
/// are only ever written together.
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Registers catalogue entries. Existing entries for the same game id are
    /// replaced.
    async fn seed_catalogue(&self, games: &[GameUnit]) -> Result<()>;

    async fn game_exists(&self, game_id: &str) -> Result<bool>;

    /// Appends a cleaned ingestion batch. Fails with `DuplicateIndex` if any
    /// incoming rental index is already present; no rows of the batch are
    /// kept in that case.
    async fn load_batch(&self, rows: &[RentalRow]) -> Result<()>;

    async fn open_rentals_for_game(&self, game_id: &str) -> Result<usize>;

    async fn open_rentals_for_customer(&self, customer_id: &str) -> Result<usize>;

    /// Issues a new rental: assigns `max(rental_index) + 1` and inserts the
    /// record together with an open period, as one atomic unit. Availability
    /// is re-checked inside the same unit; if the game gained an open period
    /// since the caller looked, fails with `Conflict` and writes nothing.
    async fn issue_rental(
        &self,
        customer_id: &str,
        game_id: &str,
        start_date: &str,
    ) -> Result<u32>;

    /// Closes every open period for the game, stamping `end_date`. Returns
    /// the number of periods closed.
    async fn close_open_periods(&self, game_id: &str, end_date: &str) -> Result<usize>;

    /// The joined record/period view for one game, ordered by rental index.
    async fn rental_history(&self, game_id: &str) -> Result<Vec<RentalRow>>;
}
