use crate::domain::dates::{self, DateError};
use crate::domain::rental::{RentalPeriod, RentalRecord, RentalRow};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// One raw line of the customer rental data file, as read from the
/// tab-separated source. Field order matches the file columns.
#[derive(Debug, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct RawRental {
    pub game_id: String,
    pub rental_start: String,
    pub rental_end: String,
    pub customer_id: String,
}

/// Why a raw record was dropped from the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("customer id must be 4 characters, got {0}")]
    CustomerIdLength(usize),
    #[error("duplicate of an already accepted record")]
    Duplicate,
    #[error("{0}")]
    Date(#[from] DateError),
}

/// A dropped record together with the offending raw input, kept so the drop
/// can be reported rather than silently discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRental {
    pub reason: RejectReason,
    pub raw: RawRental,
}

/// An accepted record: dates canonicalized, rental index assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedRental {
    pub rental_index: u32,
    pub game_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub customer_id: String,
}

impl CleanedRental {
    pub fn into_row(self) -> RentalRow {
        RentalRow {
            record: RentalRecord {
                rental_index: self.rental_index,
                customer_id: self.customer_id,
                game_id: self.game_id,
            },
            period: RentalPeriod {
                rental_index: self.rental_index,
                start_date: self.start_date,
                end_date: self.end_date,
            },
        }
    }
}

/// Outcome of cleaning one ingestion batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub accepted: Vec<CleanedRental>,
    pub rejected: Vec<RejectedRental>,
}

impl IngestReport {
    pub fn rows(&self) -> Vec<RentalRow> {
        self.accepted.iter().cloned().map(CleanedRental::into_row).collect()
    }
}

/// Runs the cleaning pipeline over a raw batch.
///
/// Checks run in order (missing data, customer-id shape, duplicate, date
/// normalization) and the first failure rejects the record. Accepted records
/// receive sequential rental indices starting at 1. Duplicates are judged on
/// the raw field tuple against records already accepted in this batch.
pub fn clean_batch(records: impl IntoIterator<Item = RawRental>) -> IngestReport {
    let mut report = IngestReport::default();
    let mut accepted_raws: HashSet<RawRental> = HashSet::new();

    for raw in records {
        match clean_one(&raw, &accepted_raws, report.accepted.len() as u32 + 1) {
            Ok(cleaned) => {
                accepted_raws.insert(raw);
                report.accepted.push(cleaned);
            }
            Err(reason) => report.rejected.push(RejectedRental { reason, raw }),
        }
    }
    report
}

fn clean_one(
    raw: &RawRental,
    accepted: &HashSet<RawRental>,
    next_index: u32,
) -> Result<CleanedRental, RejectReason> {
    if raw.game_id.is_empty() {
        return Err(RejectReason::MissingField("game_id"));
    }
    if raw.rental_start.is_empty() {
        return Err(RejectReason::MissingField("rental_start"));
    }
    if raw.customer_id.is_empty() {
        return Err(RejectReason::MissingField("customer_id"));
    }

    let id_len = raw.customer_id.chars().count();
    if id_len != 4 {
        return Err(RejectReason::CustomerIdLength(id_len));
    }

    if accepted.contains(raw) {
        return Err(RejectReason::Duplicate);
    }

    let start_date = dates::canonicalize(&raw.rental_start)?;
    let end_date = if raw.rental_end.trim().is_empty() {
        None
    } else {
        Some(dates::canonicalize(&raw.rental_end)?)
    };

    Ok(CleanedRental {
        rental_index: next_index,
        game_id: raw.game_id.clone(),
        start_date,
        end_date,
        customer_id: raw.customer_id.clone(),
    })
}
