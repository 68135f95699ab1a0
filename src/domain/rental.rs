use rust_decimal::Decimal;
use serde::Deserialize;

/// One rentable physical copy, as listed in the business games catalogue.
///
/// Catalogue attributes are reference data: the engine only ever consults the
/// catalogue for existence, availability and rental state live in the rental
/// tables.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct GameUnit {
    pub game_id: String,
    pub title: String,
    pub platform: String,
    pub genre: String,
    pub purchase_price: Decimal,
    pub purchase_date: String,
}

/// One rental transaction linking a customer to a game copy. Insert-only.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RentalRecord {
    pub rental_index: u32,
    pub customer_id: String,
    pub game_id: String,
}

/// The period a rental was out. `end_date` of `None` means the copy has not
/// been returned. Mutated exactly once, when a return closes it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RentalPeriod {
    pub rental_index: u32,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl RentalPeriod {
    pub fn is_open(&self) -> bool {
        match &self.end_date {
            None => true,
            Some(end) => end.is_empty(),
        }
    }
}

/// One row of the derived view joining rental records to their periods.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RentalRow {
    pub record: RentalRecord,
    pub period: RentalPeriod,
}

/// Rental state of a game copy, resolved from its open-period count.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Availability {
    Available,
    HiredOut,
    /// More than one period open at once. An integrity violation: still
    /// unavailable, but callers must surface it rather than treat it as a
    /// plain hire.
    MultipleOpenRentals,
}

impl Availability {
    pub fn from_open_count(open: usize) -> Self {
        match open {
            0 => Self::Available,
            1 => Self::HiredOut,
            _ => Self::MultipleOpenRentals,
        }
    }

    pub fn is_unavailable(self) -> bool {
        !matches!(self, Self::Available)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available to rent out"),
            Self::HiredOut => write!(f, "rented out already"),
            Self::MultipleOpenRentals => write!(f, "rented out multiple times at the same time"),
        }
    }
}
