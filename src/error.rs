use thiserror::Error;

pub type Result<T> = std::result::Result<T, RentalError>;

/// Infrastructure and integrity failures.
///
/// Expected business conditions (refused rentals, unknown games on return,
/// rejected ingestion records) are *not* errors; they are carried as outcome
/// and report values so callers always receive a descriptive message.
#[derive(Error, Debug)]
pub enum RentalError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no subscription record for customer {0}")]
    UnknownCustomer(String),
    #[error("rental index {0} is already present")]
    DuplicateIndex(u32),
    #[error("issuance for game {0} lost to a concurrent rental")]
    Conflict(String),
    #[cfg(feature = "storage-sqlite")]
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}
