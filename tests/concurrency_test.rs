use chrono::Duration;
use movie_reservation_system::models::reservation::ReservationRequest;
use movie_reservation_system::store::ReservationStore;
use movie_reservation_system::utils::error::AppError;
use rust_decimal::Decimal;
use std::collections::HashSet;
use test_context::{test_context, AsyncTestContext as _};
use tokio::task::JoinSet;

mod common {
    pub mod test_utils;
}
use common::test_utils::{seats, seed_showtime, ReservationTestContext};

fn request(showtime_id: &str, labels: &[&str]) -> ReservationRequest {
    ReservationRequest {
        showtime_id: showtime_id.to_string(),
        seats: seats(labels),
        total_amount: Decimal::from(500),
    }
}

#[test_context(ReservationTestContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_race_has_exactly_one_winner(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));

    let mut join_set = JoinSet::new();
    for (user_id, labels) in [("user-1", ["A1", "A2"]), ("user-2", ["A2", "A3"])] {
        let service = ctx.service.clone();
        let request = request(&showtime.id, &labels);
        join_set.spawn(async move { service.book(user_id, request).await });
    }

    let mut successes = 0;
    let mut conflicts = Vec::new();
    while let Some(result) = join_set.join_next().await {
        match result.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::SeatsAlreadyTaken { seats }) => conflicts.push(seats),
            Err(other) => panic!("unexpected rejection: {:?}", other),
        }
    }

    assert_eq!(successes, 1, "exactly one booking should win");
    assert_eq!(conflicts.len(), 1);
    assert!(
        conflicts[0].contains(&"A2".to_string()),
        "the loser must be told A2 is the conflict, got {:?}",
        conflicts[0]
    );
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_seat_contention_admits_one_of_many(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));
    let num_users = 10;

    let mut join_set = JoinSet::new();
    for i in 0..num_users {
        let service = ctx.service.clone();
        let request = request(&showtime.id, &["A1"]);
        join_set.spawn(async move { (i, service.book(&format!("user-{}", i), request).await) });
    }

    let mut successful_bookings = 0;
    while let Some(result) = join_set.join_next().await {
        let (_, result) = result.unwrap();
        match result {
            Ok(_) => successful_bookings += 1,
            Err(AppError::SeatsAlreadyTaken { seats }) => {
                assert_eq!(seats, vec!["A1".to_string()])
            }
            Err(other) => panic!("unexpected rejection: {:?}", other),
        }
    }

    assert_eq!(successful_bookings, 1, "Only one booking should succeed");
    assert_eq!(ctx.store.occupied_seats(&showtime.id).await?.len(), 1);
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn capacity_bound_holds_under_contention(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    // 20 users race for 20 distinct seats in a 5-seat hall.
    let capacity = 5;
    let num_users = 20;
    let showtime = seed_showtime(&ctx.store, capacity, Duration::hours(6));

    let mut join_set = JoinSet::new();
    for i in 0..num_users {
        let service = ctx.service.clone();
        let label = format!("A{}", i + 1);
        let request = request(&showtime.id, &[label.as_str()]);
        join_set.spawn(async move { service.book(&format!("user-{}", i), request).await });
    }

    let mut successful_bookings = 0;
    let mut claimed = HashSet::new();
    while let Some(result) = join_set.join_next().await {
        match result.unwrap() {
            Ok(details) => {
                successful_bookings += 1;
                for seat in details.reservation.seats {
                    assert!(claimed.insert(seat), "no seat may be granted twice");
                }
            }
            Err(AppError::InsufficientCapacity { .. }) => {}
            Err(other) => panic!("unexpected rejection: {:?}", other),
        }
    }

    assert_eq!(
        successful_bookings, capacity as usize,
        "Only {} bookings should succeed",
        capacity
    );
    assert_eq!(
        ctx.store.occupied_seats(&showtime.id).await?.len(),
        capacity as usize
    );
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_concurrent_requests_both_succeed(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));

    let mut join_set = JoinSet::new();
    for (user_id, labels) in [("user-1", ["A1", "A2"]), ("user-2", ["B1", "B2"])] {
        let service = ctx.service.clone();
        let request = request(&showtime.id, &labels);
        join_set.spawn(async move { service.book(user_id, request).await });
    }

    while let Some(result) = join_set.join_next().await {
        result.unwrap()?;
    }
    assert_eq!(ctx.store.occupied_seats(&showtime.id).await?.len(), 4);
    Ok(())
}
