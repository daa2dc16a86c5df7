//! Copy store concurrency and sweeper tests
//!
//! Run against a migrated database: DATABASE_URL must point at a
//! Postgres instance where `sqlx migrate run` has been applied.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use circulation_server::{
    config::CirculationConfig,
    error::AppError,
    models::copy::{CheckoutCopy, CopyState, LoanType},
    repository::Repository,
    services::{audit::TracingAuditSink, Services},
};

async fn connect() -> Pool<Postgres> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to database")
}

async fn seed_title_and_patron(pool: &Pool<Postgres>) -> (i32, i32) {
    let title_id: i32 =
        sqlx::query_scalar("INSERT INTO titles (title, active) VALUES ('Test Title', true) RETURNING id")
            .fetch_one(pool)
            .await
            .expect("Failed to seed title");
    let patron_id: i32 =
        sqlx::query_scalar("INSERT INTO patrons (name, status) VALUES ('Test Patron', 0) RETURNING id")
            .fetch_one(pool)
            .await
            .expect("Failed to seed patron");
    (title_id, patron_id)
}

fn checkout_for(title_id: i32, copy_number: i32, patron_id: i32) -> CheckoutCopy {
    CheckoutCopy {
        title_id,
        copy_number,
        patron_id,
        loan_type: LoanType::Standard,
        due_date: None,
        checked_out_by: None,
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn concurrent_checkouts_of_same_slot_admit_exactly_one() {
    let pool = connect().await;
    let (title_id, patron_a) = seed_title_and_patron(&pool).await;
    let patron_b: i32 =
        sqlx::query_scalar("INSERT INTO patrons (name, status) VALUES ('Second Patron', 0) RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();

    let repository = Repository::new(pool);
    repository
        .copies
        .add_to_inventory(title_id, 1)
        .await
        .expect("Failed to stock copy");

    let due = Utc::now() + Duration::days(14);
    let now = Utc::now();
    let checkout_a = checkout_for(title_id, 1, patron_a);
    let checkout_b = checkout_for(title_id, 1, patron_b);
    let a = repository.copies.claim(&checkout_a, due, 2, now);
    let b = repository.copies.claim(&checkout_b, due, 2, now);

    let (ra, rb) = tokio::join!(a, b);
    let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent checkout must win");

    let loser = if ra.is_ok() { rb } else { ra };
    assert!(matches!(loser, Err(AppError::CopyUnavailable)));
}

#[tokio::test]
#[ignore]
async fn sweeper_is_idempotent() {
    let pool = connect().await;
    let (title_id, patron_id) = seed_title_and_patron(&pool).await;

    let repository = Repository::new(pool.clone());
    let services = Services::new(
        repository.clone(),
        CirculationConfig::default(),
        Arc::new(TracingAuditSink),
    );

    repository.copies.add_to_inventory(title_id, 1).await.unwrap();
    let overdue_due = Utc::now() - Duration::days(1);
    let copy = repository
        .copies
        .claim(
            &checkout_for(title_id, 1, patron_id),
            overdue_due,
            2,
            Utc::now() - Duration::days(15),
        )
        .await
        .unwrap();

    let first = services.sweeper.sweep().await.unwrap();
    assert!(first >= 1);

    let swept = repository.copies.get_by_id(copy.id).await.unwrap();
    assert_eq!(swept.state, CopyState::Overdue);
    assert_eq!(swept.due_at, copy.due_at);
    assert_eq!(swept.renewal_count, copy.renewal_count);

    // Second pass with no intervening mutation changes nothing
    services.sweeper.sweep().await.unwrap();
    let again = repository.copies.get_by_id(copy.id).await.unwrap();
    assert_eq!(again.state, CopyState::Overdue);
    assert_eq!(again.version, swept.version);
}

#[tokio::test]
#[ignore]
async fn overdue_copy_is_still_returnable() {
    let pool = connect().await;
    let (title_id, patron_id) = seed_title_and_patron(&pool).await;

    let repository = Repository::new(pool);
    let services = Services::new(
        repository.clone(),
        CirculationConfig::default(),
        Arc::new(TracingAuditSink),
    );

    repository.copies.add_to_inventory(title_id, 1).await.unwrap();
    let copy = repository
        .copies
        .claim(
            &checkout_for(title_id, 1, patron_id),
            Utc::now() - Duration::days(1),
            2,
            Utc::now() - Duration::days(15),
        )
        .await
        .unwrap();

    services.sweeper.sweep().await.unwrap();

    let returned = services
        .circulation
        .return_copy(circulation_server::models::copy::ReturnCopy {
            copy_id: copy.id,
            returned_by: Some("desk".to_string()),
            condition: circulation_server::models::copy::ConditionCode::Normal,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(returned.state, CopyState::Returned);
    assert!(returned.returned_at.is_some());
    assert_eq!(returned.borrower_id, Some(patron_id));
}

#[tokio::test]
#[ignore]
async fn business_rule_gate_blocks_at_cap_and_reopens_after_return() {
    let pool = connect().await;
    let (title_id, patron_id) = seed_title_and_patron(&pool).await;

    let repository = Repository::new(pool.clone());
    let services = Services::new(
        repository.clone(),
        CirculationConfig::default(),
        Arc::new(TracingAuditSink),
    );

    // Five distinct titles so the duplicate-title guard stays out of
    // the way; the active-loan cap is what should fire
    let mut copies = Vec::new();
    for n in 0..5 {
        let extra_title: i32 = sqlx::query_scalar(
            "INSERT INTO titles (title, active) VALUES ($1, true) RETURNING id",
        )
        .bind(format!("Filler {}", n))
        .fetch_one(&pool)
        .await
        .unwrap();
        services.circulation.add_copy(extra_title, 1).await.unwrap();
        let checked_out = services
            .circulation
            .checkout(checkout_for(extra_title, 1, patron_id))
            .await
            .unwrap();
        copies.push(checked_out);
    }

    services.circulation.add_copy(title_id, 1).await.unwrap();
    let err = services
        .circulation
        .checkout(checkout_for(title_id, 1, patron_id))
        .await
        .unwrap_err();
    match err {
        AppError::TooManyActiveLoans { active, limit } => {
            assert_eq!(active, 5);
            assert_eq!(limit, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // One return frees a slot and the checkout goes through
    services
        .circulation
        .return_copy(circulation_server::models::copy::ReturnCopy {
            copy_id: copies[0].id,
            returned_by: None,
            condition: circulation_server::models::copy::ConditionCode::Normal,
            notes: None,
        })
        .await
        .unwrap();

    let copy = services
        .circulation
        .checkout(checkout_for(title_id, 1, patron_id))
        .await
        .unwrap();
    assert_eq!(copy.state, CopyState::Borrowed);
}
