#![cfg(feature = "storage-sqlite")]

use rental_engine::application::engine::{RentOutcome, RentalEngine, ReturnOutcome};
use rental_engine::domain::dates;
use rental_engine::domain::ports::RentalStore;
use rental_engine::domain::rental::{Availability, GameUnit};
use rental_engine::domain::subscription::{Subscription, SubscriptionMap, SubscriptionTier};
use rental_engine::infrastructure::sqlite::SqliteRentalStore;
use rust_decimal_macros::dec;

fn directory() -> SubscriptionMap {
    SubscriptionMap::from_entries([Subscription {
        customer_id: "9967".to_string(),
        tier: SubscriptionTier::Silver,
        active: true,
    }])
}

fn game(id: &str) -> GameUnit {
    GameUnit {
        game_id: id.to_string(),
        title: "Outrun".to_string(),
        platform: "Mega Drive".to_string(),
        genre: "Racing".to_string(),
        purchase_price: dec!(39.99),
        purchase_date: "01-06-2020".to_string(),
    }
}

#[tokio::test]
async fn test_rent_then_return_against_relational_store() {
    let store = SqliteRentalStore::in_memory().await.unwrap();
    store.seed_catalogue(&[game("50")]).await.unwrap();
    let engine = RentalEngine::new(Box::new(store.clone()), Box::new(directory()));

    let outcome = engine.rent("9967", "50").await.unwrap();
    assert_eq!(
        outcome,
        RentOutcome::Issued {
            rental_index: 1,
            customer_id: "9967".to_string(),
            game_id: "50".to_string(),
        }
    );
    assert_eq!(
        engine.availability("50").await.unwrap(),
        Availability::HiredOut
    );

    let outcome = engine.return_game("50").await.unwrap();
    assert_eq!(
        outcome,
        ReturnOutcome::Returned {
            game_id: "50".to_string(),
            closed: 1,
        }
    );
    assert_eq!(
        engine.availability("50").await.unwrap(),
        Availability::Available
    );

    // Exactly one record/period pair remains and the period is closed with
    // today's canonical date.
    let history = store.rental_history("50").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0].period.end_date.as_deref(),
        Some(dates::today_canonical().as_str())
    );
}

#[tokio::test]
async fn test_limit_refusal_leaves_no_partial_rows() {
    let store = SqliteRentalStore::in_memory().await.unwrap();
    store
        .seed_catalogue(&[game("50"), game("51"), game("52")])
        .await
        .unwrap();
    let engine = RentalEngine::new(Box::new(store.clone()), Box::new(directory()));

    // Silver limit is 2.
    engine.rent("9967", "50").await.unwrap();
    engine.rent("9967", "51").await.unwrap();

    let outcome = engine.rent("9967", "52").await.unwrap();
    assert_eq!(
        outcome,
        RentOutcome::LimitExceeded {
            customer_id: "9967".to_string()
        }
    );
    assert!(store.rental_history("52").await.unwrap().is_empty());
    assert_eq!(store.open_rentals_for_customer("9967").await.unwrap(), 2);
}
