use crate::application::ingest::RawRental;
use crate::error::{RentalError, Result};
use std::io::Read;

/// Reads raw rental records from a header-prefixed, tab-separated source.
///
/// Yields `Result<RawRental>` lazily so large files stream without loading
/// everything up front. Unreadable lines surface as errors for the caller to
/// report; content-level validation happens later in the cleaning pipeline.
pub struct RentalReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RentalReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn records(self) -> impl Iterator<Item = Result<RawRental>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RentalError::from))
    }
}
