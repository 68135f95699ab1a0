use crate::domain::subscription::{Subscription, SubscriptionMap, SubscriptionTier};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct SubscriptionRow {
    customer_id: String,
    tier: String,
    status: String,
}

/// Loads the customer subscription directory from a tab-separated,
/// header-prefixed file. Rows that cannot be interpreted are skipped with a
/// warning; the directory itself is reference data, not part of the cleaned
/// rental batch.
pub struct SubscriptionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SubscriptionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn load(self) -> SubscriptionMap {
        let mut entries = Vec::new();
        for result in self.reader.into_deserialize::<SubscriptionRow>() {
            let row = match result {
                Ok(row) => row,
                Err(error) => {
                    warn!(%error, "skipping unreadable subscription row");
                    continue;
                }
            };
            let tier: SubscriptionTier = match row.tier.parse() {
                Ok(tier) => tier,
                Err(error) => {
                    warn!(customer_id = %row.customer_id, %error, "skipping subscription row");
                    continue;
                }
            };
            let active = match row.status.to_ascii_lowercase().as_str() {
                "active" => true,
                "inactive" => false,
                other => {
                    warn!(
                        customer_id = %row.customer_id,
                        status = other,
                        "skipping subscription row with unknown status"
                    );
                    continue;
                }
            };
            entries.push(Subscription {
                customer_id: row.customer_id,
                tier,
                active,
            });
        }
        SubscriptionMap::from_entries(entries)
    }
}

/// Convenience for the shell: load the directory straight from a file path.
pub fn load_subscriptions<P: AsRef<Path>>(path: P) -> Result<SubscriptionMap> {
    let file = std::fs::File::open(path)?;
    Ok(SubscriptionReader::new(file).load())
}
