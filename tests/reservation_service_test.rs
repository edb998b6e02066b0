use chrono::Duration;
use movie_reservation_system::models::reservation::{
    PaymentStatus, ReservationRequest, ReservationStatus,
};
use movie_reservation_system::models::user::Role;
use movie_reservation_system::store::{NewReservation, ReservationStore};
use movie_reservation_system::utils::error::AppError;
use rust_decimal::Decimal;
use test_context::{test_context, AsyncTestContext as _};

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
#[tokio::test]
async fn booking_creates_pending_reservation(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));

    let details = ctx
        .service
        .book("user-1", request(&showtime.id, &["A1", "A2"]))
        .await?;

    assert_eq!(details.reservation.status, ReservationStatus::Pending);
    assert_eq!(details.reservation.payment_status, PaymentStatus::Pending);
    assert_eq!(details.reservation.seats, seats(&["A1", "A2"]));
    assert_eq!(details.reservation.total_amount, Decimal::from(500));
    assert!(!details.reservation.reminder_sent);
    assert_eq!(details.showtime.movie_title, "Interstellar");
    assert_eq!(details.showtime.hall_name, "Hall 1");
    assert_eq!(details.showtime.theater_name, "Galaxy Cinemas");
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn rebooking_committed_seats_is_always_rejected(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));
    ctx.service
        .book("user-1", request(&showtime.id, &["A1", "A2"]))
        .await?;

    // Same rejection every time, never a silent duplicate.
    for _ in 0..2 {
        let err = ctx
            .service
            .book("user-2", request(&showtime.id, &["A1"]))
            .await
            .unwrap_err();
        match err {
            AppError::SeatsAlreadyTaken { seats } => assert_eq!(seats, vec!["A1".to_string()]),
            other => panic!("expected SeatsAlreadyTaken, got {:?}", other),
        }
    }
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn overlap_names_only_the_conflicting_seats(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));
    ctx.service
        .book("user-1", request(&showtime.id, &["A1", "A2"]))
        .await?;

    let err = ctx
        .service
        .book("user-2", request(&showtime.id, &["A2", "A3"]))
        .await
        .unwrap_err();
    match err {
        AppError::SeatsAlreadyTaken { seats } => assert_eq!(seats, vec!["A2".to_string()]),
        other => panic!("expected SeatsAlreadyTaken, got {:?}", other),
    }
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn capacity_rejection_reports_both_counts(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 3, Duration::hours(6));
    ctx.service
        .book("user-1", request(&showtime.id, &["A1", "A2"]))
        .await?;

    let err = ctx
        .service
        .book("user-2", request(&showtime.id, &["B1", "B2"]))
        .await
        .unwrap_err();
    match err {
        AppError::InsufficientCapacity {
            available,
            requested,
        } => {
            assert_eq!(available, 1);
            assert_eq!(requested, 2);
        }
        other => panic!("expected InsufficientCapacity, got {:?}", other),
    }
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn eleven_seats_rejected_regardless_of_capacity(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 1000, Duration::hours(6));
    let labels: Vec<String> = (1..=11).map(|n| format!("A{}", n)).collect();

    let err = ctx
        .service
        .book(
            "user-1",
            ReservationRequest {
                showtime_id: showtime.id.clone(),
                seats: labels,
                total_amount: Decimal::from(500),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn lowercase_seat_label_is_rejected(ctx: &ReservationTestContext) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));

    let err = ctx
        .service
        .book("user-1", request(&showtime.id, &["a1"]))
        .await
        .unwrap_err();
    match err {
        AppError::InvalidSeatFormat { labels } => assert_eq!(labels, vec!["a1".to_string()]),
        other => panic!("expected InvalidSeatFormat, got {:?}", other),
    }
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn repeated_labels_in_one_request_are_rejected(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));

    let err = ctx
        .service
        .book("user-1", request(&showtime.id, &["A1", "A2", "A1"]))
        .await
        .unwrap_err();
    match err {
        AppError::SeatsAlreadyTaken { seats } => assert_eq!(seats, vec!["A1".to_string()]),
        other => panic!("expected SeatsAlreadyTaken, got {:?}", other),
    }
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn unknown_and_inactive_showtimes_are_not_bookable(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let err = ctx
        .service
        .book("user-1", request("no-such-showtime", &["A1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ShowtimeNotFound));

    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));
    ctx.store.deactivate_showtime(&showtime.id);
    let err = ctx
        .service
        .book("user-1", request(&showtime.id, &["A1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ShowtimeNotFound));
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn past_showtime_is_not_bookable(ctx: &ReservationTestContext) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(-1));

    let err = ctx
        .service
        .book("user-1", request(&showtime.id, &["A1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ShowtimeInPast));
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn non_positive_amount_is_rejected(ctx: &ReservationTestContext) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));

    let err = ctx
        .service
        .book(
            "user-1",
            ReservationRequest {
                showtime_id: showtime.id.clone(),
                seats: seats(&["A1"]),
                total_amount: Decimal::ZERO,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount));
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn reservations_are_visible_to_owner_and_admin_only(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));
    let details = ctx
        .service
        .book("user-1", request(&showtime.id, &["A1"]))
        .await?;
    let id = details.reservation.id.clone();

    assert!(ctx
        .service
        .get_reservation(&id, "user-1", Role::User)
        .await
        .is_ok());
    assert!(ctx
        .service
        .get_reservation(&id, "user-2", Role::Admin)
        .await
        .is_ok());

    // A stranger gets the same answer as for a reservation that never existed.
    let foreign = ctx
        .service
        .get_reservation(&id, "user-2", Role::User)
        .await
        .unwrap_err();
    let missing = ctx
        .service
        .get_reservation("no-such-id", "user-2", Role::User)
        .await
        .unwrap_err();
    assert_eq!(foreign.to_string(), missing.to_string());
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn user_listing_is_newest_first_with_context(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 100, Duration::hours(6));
    let first = ctx
        .service
        .book("user-1", request(&showtime.id, &["A1"]))
        .await?;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = ctx
        .service
        .book("user-1", request(&showtime.id, &["A2"]))
        .await?;
    ctx.service
        .book("user-2", request(&showtime.id, &["B1"]))
        .await?;

    let listing = ctx.service.list_user_reservations("user-1").await?;
    assert_eq!(listing.count, 2);
    assert_eq!(listing.reservations[0].reservation.id, second.reservation.id);
    assert_eq!(listing.reservations[1].reservation.id, first.reservation.id);
    assert_eq!(listing.reservations[0].showtime.movie_title, "Interstellar");
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn showtime_statistics_break_down_by_status(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 50, Duration::hours(6));

    // pending: 2 seats
    ctx.service
        .book("user-1", request(&showtime.id, &["A1", "A2"]))
        .await?;
    // confirmed: 3 seats
    let confirmed = ctx
        .service
        .book("user-2", request(&showtime.id, &["B1", "B2", "B3"]))
        .await?;
    ctx.store
        .confirm_reservation(&confirmed.reservation.id)
        .await?;
    // cancelled: does not count against occupancy
    let cancelled = ctx
        .service
        .book("user-3", request(&showtime.id, &["C1"]))
        .await?;
    ctx.store
        .cancel_reservation(&cancelled.reservation.id)
        .await?;

    let response = ctx.service.list_showtime_reservations(&showtime.id).await?;
    assert_eq!(response.count, 3);
    assert_eq!(response.statistics.total_seats, 50);
    assert_eq!(response.statistics.pending_seats, 2);
    assert_eq!(response.statistics.confirmed_seats, 3);
    assert_eq!(response.statistics.reserved_seats, 5);
    assert_eq!(response.statistics.available_seats, 45);
    Ok(())
}

#[test_context(ReservationTestContext)]
#[tokio::test]
async fn direct_store_writes_uphold_the_same_invariants(
    ctx: &ReservationTestContext,
) -> Result<(), AppError> {
    let showtime = seed_showtime(&ctx.store, 2, Duration::hours(6));
    ctx.store
        .create_reservation(NewReservation {
            user_id: "user-1".to_string(),
            showtime_id: showtime.id.clone(),
            seats: seats(&["A1", "A2"]),
            total_amount: Decimal::from(300),
        })
        .await?;

    // The atomic claim itself rejects both overlap and overflow.
    let err = ctx
        .store
        .create_reservation(NewReservation {
            user_id: "user-2".to_string(),
            showtime_id: showtime.id.clone(),
            seats: seats(&["A2"]),
            total_amount: Decimal::from(150),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientCapacity { .. }));
    Ok(())
}
