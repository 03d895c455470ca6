use engine::{Ledger, LedgerError, NewTrip};
use migration::MigratorTrait;
use sea_orm::Database;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::new(db)
}

fn rub_usd_trip(user_id: i64, rate: f64, initial: f64) -> NewTrip {
    NewTrip {
        user_id,
        trip_name: "Russia → USA".to_string(),
        country_from: "Russia".to_string(),
        country_to: "USA".to_string(),
        currency_from: "RUB".to_string(),
        currency_to: "USD".to_string(),
        exchange_rate: rate,
        initial_amount_from: initial,
        balance_to: initial * rate,
    }
}

#[tokio::test]
async fn add_user_is_idempotent() {
    let ledger = ledger_with_db().await;

    ledger.add_user(42, Some("alice")).await.unwrap();
    ledger.add_user(42, Some("alice")).await.unwrap();
    ledger.add_user(42, None).await.unwrap();
}

#[tokio::test]
async fn create_trip_sets_balances_and_activates() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();

    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 0.011, 100_000.0))
        .await
        .unwrap();

    let trip = ledger.active_trip(1).await.unwrap().unwrap();
    assert_eq!(trip.trip_id, trip_id);
    assert_eq!(trip.balance_from, 100_000.0);
    assert_eq!(trip.balance_to, 1100.0);
    assert_eq!(trip.exchange_rate, 0.011);
    assert!(trip.is_active);
}

#[tokio::test]
async fn at_most_one_trip_is_active() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();

    let first = ledger
        .create_trip(rub_usd_trip(1, 0.011, 100_000.0))
        .await
        .unwrap();
    let second = ledger
        .create_trip(rub_usd_trip(1, 0.012, 50_000.0))
        .await
        .unwrap();

    let trips = ledger.trips(1).await.unwrap();
    assert_eq!(trips.len(), 2);
    assert_eq!(trips.iter().filter(|t| t.is_active).count(), 1);

    let active = ledger.active_trip(1).await.unwrap().unwrap();
    assert_eq!(active.trip_id, second);

    assert!(ledger.switch_active_trip(1, first).await.unwrap());
    let trips = ledger.trips(1).await.unwrap();
    assert_eq!(trips.iter().filter(|t| t.is_active).count(), 1);
    assert_eq!(ledger.active_trip(1).await.unwrap().unwrap().trip_id, first);
}

#[tokio::test]
async fn switch_to_foreign_trip_fails_without_side_effects() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    ledger.add_user(2, Some("bob")).await.unwrap();

    let alice_trip = ledger
        .create_trip(rub_usd_trip(1, 0.011, 100_000.0))
        .await
        .unwrap();
    ledger
        .create_trip(rub_usd_trip(2, 0.02, 1000.0))
        .await
        .unwrap();

    assert!(!ledger.switch_active_trip(2, alice_trip).await.unwrap());
    assert!(!ledger.switch_active_trip(1, 999).await.unwrap());

    // Both users keep their own active trip untouched.
    assert_eq!(
        ledger.active_trip(1).await.unwrap().unwrap().trip_id,
        alice_trip
    );
    assert!(ledger.active_trip(2).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn no_trips_means_no_active_trip() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();

    assert!(ledger.active_trip(1).await.unwrap().is_none());
    assert!(ledger.trips(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn expense_decrements_both_balances_exactly() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 0.011, 100_000.0))
        .await
        .unwrap();

    // Provider unreachable: amount_from derives from the stored rate.
    let amount_from = 50.0 / 0.011;
    let trip = ledger
        .add_expense(trip_id, 50.0, amount_from, None)
        .await
        .unwrap();

    assert_eq!(trip.balance_to, 1100.0 - 50.0);
    assert_eq!(trip.balance_from, 100_000.0 - amount_from);
}

#[tokio::test]
async fn balances_may_go_negative() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 1.0, 100.0))
        .await
        .unwrap();

    let trip = ledger
        .add_expense(trip_id, 150.0, 150.0, None)
        .await
        .unwrap();
    assert_eq!(trip.balance_to, -50.0);
    assert_eq!(trip.balance_from, -50.0);
}

#[tokio::test]
async fn expense_rejects_non_positive_amounts_and_unknown_trip() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 1.0, 100.0))
        .await
        .unwrap();

    let err = ledger.add_expense(trip_id, 0.0, 10.0, None).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    let err = ledger.add_expense(999, 10.0, 10.0, None).await.unwrap_err();
    assert_eq!(err, LedgerError::TripNotFound(999));
}

#[tokio::test]
async fn expenses_are_listed_newest_first_and_capped() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 1.0, 1000.0))
        .await
        .unwrap();

    for i in 1..=5 {
        ledger
            .add_expense(trip_id, f64::from(i), f64::from(i), None)
            .await
            .unwrap();
    }

    let expenses = ledger.expenses(trip_id, 3).await.unwrap();
    assert_eq!(expenses.len(), 3);
    assert_eq!(expenses[0].amount_to, 5.0);
    assert_eq!(expenses[1].amount_to, 4.0);
    assert_eq!(expenses[2].amount_to, 3.0);
}

#[tokio::test]
async fn rate_update_resynchronizes_balance_to() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 0.011, 100_000.0))
        .await
        .unwrap();

    // Spend first so balance_from is no longer the initial amount.
    let trip = ledger
        .add_expense(trip_id, 50.0, 50.0 / 0.011, None)
        .await
        .unwrap();
    let balance_from = trip.balance_from;

    let updated = ledger
        .update_exchange_rate(trip_id, 0.012)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.exchange_rate, 0.012);
    assert_eq!(updated.balance_from, balance_from);
    assert_eq!(updated.balance_to, balance_from * 0.012);
}

#[tokio::test]
async fn rate_update_on_unknown_trip_reports_failure() {
    let ledger = ledger_with_db().await;

    assert!(ledger.update_exchange_rate(999, 0.5).await.unwrap().is_none());

    let err = ledger.update_exchange_rate(999, 0.0).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
}

#[tokio::test]
async fn statistics_aggregate_all_expenses() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();
    let trip_id = ledger
        .create_trip(rub_usd_trip(1, 1.0, 1000.0))
        .await
        .unwrap();

    let stats = ledger.statistics(trip_id).await.unwrap();
    assert_eq!(stats.count, 0);
    assert_eq!(stats.total_spent_from, 0.0);
    assert_eq!(stats.total_spent_to, 0.0);

    ledger.add_expense(trip_id, 10.0, 20.0, None).await.unwrap();
    ledger.add_expense(trip_id, 5.0, 10.0, None).await.unwrap();

    let stats = ledger.statistics(trip_id).await.unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total_spent_to, 15.0);
    assert_eq!(stats.total_spent_from, 30.0);
}

#[tokio::test]
async fn trips_are_listed_newest_first() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();

    let first = ledger
        .create_trip(rub_usd_trip(1, 0.011, 100_000.0))
        .await
        .unwrap();
    let second = ledger
        .create_trip(rub_usd_trip(1, 0.012, 50_000.0))
        .await
        .unwrap();

    let trips = ledger.trips(1).await.unwrap();
    assert_eq!(trips[0].trip_id, second);
    assert_eq!(trips[1].trip_id, first);
}

#[tokio::test]
async fn create_trip_rejects_non_positive_inputs() {
    let ledger = ledger_with_db().await;
    ledger.add_user(1, Some("alice")).await.unwrap();

    let mut bad = rub_usd_trip(1, 0.0, 100.0);
    assert!(matches!(
        ledger.create_trip(bad.clone()).await.unwrap_err(),
        LedgerError::InvalidAmount(_)
    ));

    bad.exchange_rate = 0.011;
    bad.initial_amount_from = -1.0;
    assert!(matches!(
        ledger.create_trip(bad).await.unwrap_err(),
        LedgerError::InvalidAmount(_)
    ));
}
