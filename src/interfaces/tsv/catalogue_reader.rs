use crate::domain::rental::GameUnit;
use crate::error::{RentalError, Result};
use std::io::Read;

/// Reads catalogue entries from the business games file (tab-separated,
/// header-prefixed).
pub struct CatalogueReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogueReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn games(self) -> impl Iterator<Item = Result<GameUnit>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RentalError::from))
    }
}
