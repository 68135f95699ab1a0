use crate::domain::dates;
use crate::domain::ports::RentalStoreBox;
use crate::domain::rental::Availability;
use crate::domain::subscription::{
    SubscriptionDirectory, SubscriptionStatus, would_exceed_limit,
};
use crate::error::{RentalError, Result};
use tracing::{info, warn};

/// Why admission control refused a customer outright.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RefusalReason {
    NoAccount,
    InactiveSubscription,
}

impl RefusalReason {
    fn from_status(status: SubscriptionStatus) -> Option<Self> {
        match status {
            SubscriptionStatus::Active => None,
            SubscriptionStatus::Inactive => Some(Self::InactiveSubscription),
            SubscriptionStatus::NonExistent => Some(Self::NoAccount),
        }
    }
}

impl std::fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAccount => write!(f, "No record of customer having an account."),
            Self::InactiveSubscription => {
                write!(f, "Customer has no active subscription plan.")
            }
        }
    }
}

/// Outcome of a rent request. Every variant renders the message handed back
/// to the calling shell.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum RentOutcome {
    Issued {
        rental_index: u32,
        customer_id: String,
        game_id: String,
    },
    GameUnavailable {
        game_id: String,
    },
    LimitExceeded {
        customer_id: String,
    },
    Refused {
        reason: RefusalReason,
    },
    RefusedAndUnavailable {
        reason: RefusalReason,
        game_id: String,
    },
}

impl std::fmt::Display for RentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issued {
                customer_id,
                game_id,
                ..
            } => write!(f, "Game Id {game_id} successfully rented out to {customer_id}."),
            Self::GameUnavailable { game_id } => {
                write!(f, "Game Id {game_id} currently rented out to another customer.")
            }
            Self::LimitExceeded { customer_id } => {
                write!(f, "{customer_id} has too many active rentals currently.")
            }
            Self::Refused { reason } => write!(f, "{reason}"),
            Self::RefusedAndUnavailable { reason, game_id } => write!(
                f,
                "{reason} Game Id {game_id} is also currently rented out to another customer."
            ),
        }
    }
}

/// Outcome of a return request.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ReturnOutcome {
    Returned { game_id: String, closed: usize },
    NotRentedOut { game_id: String },
    UnknownGame { game_id: String },
}

impl std::fmt::Display for ReturnOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Returned { game_id, .. } => {
                write!(f, "Game Id {game_id} successfully returned.")
            }
            Self::NotRentedOut { game_id } => write!(
                f,
                "Game Id {game_id} is currently available for hire, please double check the game id."
            ),
            Self::UnknownGame { game_id } => write!(
                f,
                "Game Id {game_id} does not exist in the rental company database, \
                 please double check the game id to return."
            ),
        }
    }
}

/// Orchestrates availability resolution, subscription admission and the
/// paired-write issuance/return operations against the storage port.
///
/// Business refusals come back as outcomes, never as errors; only
/// infrastructure failures surface as `Err`.
pub struct RentalEngine {
    store: RentalStoreBox,
    subscriptions: Box<dyn SubscriptionDirectory>,
}

impl RentalEngine {
    pub fn new(store: RentalStoreBox, subscriptions: Box<dyn SubscriptionDirectory>) -> Self {
        Self {
            store,
            subscriptions,
        }
    }

    /// Rental state of a game, resolved from its open-period count.
    pub async fn availability(&self, game_id: &str) -> Result<Availability> {
        let open = self.store.open_rentals_for_game(game_id).await?;
        let availability = Availability::from_open_count(open);
        if availability == Availability::MultipleOpenRentals {
            warn!(game_id, open, "multiple rental periods open for one game");
        }
        Ok(availability)
    }

    /// Admits or refuses a rental request and issues the rental when all
    /// checks pass.
    pub async fn rent(&self, customer_id: &str, game_id: &str) -> Result<RentOutcome> {
        let availability = self.availability(game_id).await?;
        let refusal = RefusalReason::from_status(self.subscriptions.status(customer_id));

        match (refusal, availability.is_unavailable()) {
            (Some(reason), true) => Ok(RentOutcome::RefusedAndUnavailable {
                reason,
                game_id: game_id.to_string(),
            }),
            (Some(reason), false) => Ok(RentOutcome::Refused { reason }),
            (None, true) => Ok(RentOutcome::GameUnavailable {
                game_id: game_id.to_string(),
            }),
            (None, false) => self.issue(customer_id, game_id).await,
        }
    }

    async fn issue(&self, customer_id: &str, game_id: &str) -> Result<RentOutcome> {
        let active = self.store.open_rentals_for_customer(customer_id).await?;
        let limit = self
            .subscriptions
            .rental_limit(customer_id)
            .ok_or_else(|| RentalError::UnknownCustomer(customer_id.to_string()))?;

        if would_exceed_limit(active, limit) {
            return Ok(RentOutcome::LimitExceeded {
                customer_id: customer_id.to_string(),
            });
        }

        let start_date = dates::today_canonical();
        match self
            .store
            .issue_rental(customer_id, game_id, &start_date)
            .await
        {
            Ok(rental_index) => {
                info!(rental_index, customer_id, game_id, "rental issued");
                Ok(RentOutcome::Issued {
                    rental_index,
                    customer_id: customer_id.to_string(),
                    game_id: game_id.to_string(),
                })
            }
            // Lost the race between the availability check and the write; the
            // store re-validated inside its transaction and refused.
            Err(RentalError::Conflict(_)) => Ok(RentOutcome::GameUnavailable {
                game_id: game_id.to_string(),
            }),
            Err(other) => Err(other),
        }
    }

    /// Processes a return, closing every open period for the game. The
    /// anomaly case (more than one open period) is surfaced before the write
    /// and then deliberately closed in bulk.
    pub async fn return_game(&self, game_id: &str) -> Result<ReturnOutcome> {
        if !self.store.game_exists(game_id).await? {
            return Ok(ReturnOutcome::UnknownGame {
                game_id: game_id.to_string(),
            });
        }

        let availability = self.availability(game_id).await?;
        if !availability.is_unavailable() {
            return Ok(ReturnOutcome::NotRentedOut {
                game_id: game_id.to_string(),
            });
        }

        let closed = self
            .store
            .close_open_periods(game_id, &dates::today_canonical())
            .await?;
        info!(game_id, closed, "rental returned");
        Ok(ReturnOutcome::Returned {
            game_id: game_id.to_string(),
            closed,
        })
    }
}
