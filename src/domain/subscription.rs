use std::collections::HashMap;
use std::str::FromStr;

/// Subscription state of a customer as reported by the directory.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    NonExistent,
}

/// Subscription plan tier. Each tier caps the number of games a customer may
/// have out at once.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SubscriptionTier {
    Bronze,
    Silver,
    Gold,
}

impl SubscriptionTier {
    pub fn rental_limit(self) -> u32 {
        match self {
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            other => Err(format!("unknown subscription tier '{other}'")),
        }
    }
}

/// One customer's entry in the subscription directory.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Subscription {
    pub customer_id: String,
    pub tier: SubscriptionTier,
    pub active: bool,
}

/// Lookup surface of the external subscription collaborator.
pub trait SubscriptionDirectory: Send + Sync {
    fn status(&self, customer_id: &str) -> SubscriptionStatus;
    fn rental_limit(&self, customer_id: &str) -> Option<u32>;
}

/// Directory backed by a loaded map, the shape produced by the subscription
/// file reader.
#[derive(Default, Clone)]
pub struct SubscriptionMap {
    entries: HashMap<String, Subscription>,
}

impl SubscriptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = Subscription>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|sub| (sub.customer_id.clone(), sub))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SubscriptionDirectory for SubscriptionMap {
    fn status(&self, customer_id: &str) -> SubscriptionStatus {
        match self.entries.get(customer_id) {
            None => SubscriptionStatus::NonExistent,
            Some(sub) if sub.active => SubscriptionStatus::Active,
            Some(_) => SubscriptionStatus::Inactive,
        }
    }

    fn rental_limit(&self, customer_id: &str) -> Option<u32> {
        self.entries
            .get(customer_id)
            .map(|sub| sub.tier.rental_limit())
    }
}

/// Would taking one more rental put the customer past their plan limit?
pub fn would_exceed_limit(active_count: usize, limit: u32) -> bool {
    active_count as u64 + 1 > u64::from(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> SubscriptionMap {
        SubscriptionMap::from_entries([
            Subscription {
                customer_id: "9967".to_string(),
                tier: SubscriptionTier::Silver,
                active: true,
            },
            Subscription {
                customer_id: "1204".to_string(),
                tier: SubscriptionTier::Gold,
                active: false,
            },
        ])
    }

    #[test]
    fn test_status_lookup() {
        let dir = directory();
        assert_eq!(dir.status("9967"), SubscriptionStatus::Active);
        assert_eq!(dir.status("1204"), SubscriptionStatus::Inactive);
        assert_eq!(dir.status("0000"), SubscriptionStatus::NonExistent);
    }

    #[test]
    fn test_tier_limits() {
        assert_eq!(SubscriptionTier::Bronze.rental_limit(), 1);
        assert_eq!(SubscriptionTier::Silver.rental_limit(), 2);
        assert_eq!(SubscriptionTier::Gold.rental_limit(), 3);
        assert_eq!(directory().rental_limit("9967"), Some(2));
        assert_eq!(directory().rental_limit("0000"), None);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("Silver".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Silver));
        assert_eq!(" gold ".parse::<SubscriptionTier>(), Ok(SubscriptionTier::Gold));
        assert!("platinum".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn test_limit_comparison_refuses_at_cap() {
        // A customer already holding `limit` games may not take another.
        assert!(!would_exceed_limit(0, 2));
        assert!(!would_exceed_limit(1, 2));
        assert!(would_exceed_limit(2, 2));
        assert!(would_exceed_limit(3, 2));
    }
}
