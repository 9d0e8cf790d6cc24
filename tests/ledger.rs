use chrono::Duration;
use gatepost::accounts::{AccountRecord, AccountStore, DynAccounts, sqlite::SqliteAccounts};
use gatepost::clock::{Clock, format_expiry};
use gatepost::error::LedgerError;
use gatepost::ledger::{Ledger, OperatorCredential, SubscriptionStatus};
use std::sync::Arc;

fn operator() -> OperatorCredential {
    OperatorCredential {
        username: "boss".to_string(),
        password: "sesame".to_string(),
    }
}

async fn setup() -> (DynAccounts, Ledger, Clock) {
    let store: DynAccounts = Arc::new(SqliteAccounts::new("sqlite::memory:").await.unwrap());
    let clock = Clock::from_offset_hours(8).unwrap();
    let ledger = Ledger::new(store.clone(), operator(), clock);
    (store, ledger, clock)
}

#[tokio::test]
async fn register_starts_expired() {
    let (store, ledger, clock) = setup().await;
    ledger.register("vip", "123").await.unwrap();

    let row = store.fetch("vip").await.unwrap().expect("row exists");
    assert_eq!(row.password, "123");
    assert_eq!(row.expiry, format_expiry(clock.today() - Duration::days(1)));

    let status = ledger.check_subscription("vip").await.unwrap();
    assert!(!status.is_active());
    assert_eq!(status.label(), row.expiry);
}

#[tokio::test]
async fn duplicate_register_leaves_row_untouched() {
    let (store, ledger, _) = setup().await;
    ledger.register("vip", "123").await.unwrap();
    let before = store.fetch("vip").await.unwrap().unwrap();

    let err = ledger.register("vip", "other").await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists(_)));

    let after = store.fetch("vip").await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn registering_the_operator_name_is_rejected() {
    let (store, ledger, _) = setup().await;
    let err = ledger.register("boss", "123").await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists(_)));
    assert!(store.fetch("boss").await.unwrap().is_none());
}

#[tokio::test]
async fn extending_a_lapsed_account_anchors_at_today() {
    let (store, ledger, clock) = setup().await;
    ledger.register("vip", "123").await.unwrap();

    let new_expiry = ledger.extend_subscription("vip", 30).await.unwrap();
    assert_eq!(new_expiry, clock.today() + Duration::days(30));

    let row = store.fetch("vip").await.unwrap().unwrap();
    assert_eq!(row.expiry, format_expiry(new_expiry));
    assert!(ledger.check_subscription("vip").await.unwrap().is_active());
}

#[tokio::test]
async fn extending_an_active_account_stacks_on_the_balance() {
    let (_, ledger, clock) = setup().await;
    ledger.register("vip", "123").await.unwrap();
    ledger.extend_subscription("vip", 30).await.unwrap();

    let new_expiry = ledger.extend_subscription("vip", 10).await.unwrap();
    assert_eq!(new_expiry, clock.today() + Duration::days(40));
}

#[tokio::test]
async fn extending_a_missing_account_mutates_nothing() {
    let (store, ledger, _) = setup().await;
    let err = ledger.extend_subscription("ghost", 30).await.unwrap_err();
    assert!(matches!(err, LedgerError::NoSuchAccount(_)));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn operator_is_always_permanent() {
    let (store, ledger, _) = setup().await;
    assert_eq!(
        ledger.check_subscription("boss").await.unwrap(),
        SubscriptionStatus::Permanent
    );

    // A stray row under the operator name changes nothing.
    store
        .insert(&AccountRecord {
            username: "boss".to_string(),
            password: "stale".to_string(),
            expiry: "2000-01-01".to_string(),
        })
        .await
        .unwrap();
    let status = ledger.check_subscription("boss").await.unwrap();
    assert_eq!(status, SubscriptionStatus::Permanent);
    assert!(status.is_active());
    assert_eq!(status.label(), "permanent");
}

#[tokio::test]
async fn expiry_today_still_counts_as_active() {
    let (store, ledger, clock) = setup().await;
    let today = format_expiry(clock.today());
    store
        .insert(&AccountRecord {
            username: "vip".to_string(),
            password: "123".to_string(),
            expiry: today.clone(),
        })
        .await
        .unwrap();

    let status = ledger.check_subscription("vip").await.unwrap();
    assert_eq!(status, SubscriptionStatus::Active { until: today });
}

#[tokio::test]
async fn unreadable_expiry_blocks_access_but_heals_on_extension() {
    let (store, ledger, clock) = setup().await;
    store
        .insert(&AccountRecord {
            username: "vip".to_string(),
            password: "123".to_string(),
            expiry: "someday".to_string(),
        })
        .await
        .unwrap();

    let err = ledger.check_subscription("vip").await.unwrap_err();
    assert!(matches!(err, LedgerError::BadExpiry(_)));

    // The broken date is treated as today when the next payment lands.
    let new_expiry = ledger.extend_subscription("vip", 5).await.unwrap();
    assert_eq!(new_expiry, clock.today() + Duration::days(5));
    assert!(ledger.check_subscription("vip").await.unwrap().is_active());
}

#[tokio::test]
async fn authenticate_compares_exact_strings() {
    let (_, ledger, _) = setup().await;
    ledger.register("vip", "123").await.unwrap();

    assert!(ledger.authenticate("vip", "123").await.unwrap());
    assert!(!ledger.authenticate("vip", "456").await.unwrap());
    assert!(!ledger.authenticate("Vip", "123").await.unwrap());
    assert!(!ledger.authenticate("ghost", "123").await.unwrap());

    assert!(ledger.authenticate("boss", "sesame").await.unwrap());
    assert!(!ledger.authenticate("boss", "open").await.unwrap());
}

#[tokio::test]
async fn missing_account_is_distinct_from_lapsed() {
    let (_, ledger, _) = setup().await;
    let err = ledger.check_subscription("ghost").await.unwrap_err();
    assert!(matches!(err, LedgerError::NoSuchAccount(_)));
}
