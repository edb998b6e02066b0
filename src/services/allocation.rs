//! Admission checks for seat allocation.
//!
//! The request-shape checks run once per booking attempt; the ledger checks
//! run again inside the store's critical section for the showtime, so the
//! decision every committed reservation was admitted under is the one taken
//! while holding the showtime's write lock.

use crate::utils::error::{AppError, AppResult};
use std::collections::HashSet;

/// Hard per-booking cap.
pub const MAX_SEATS_PER_BOOKING: usize = 10;

/// Validates the shape of a requested seat set: non-empty, within the
/// per-booking cap, every label well-formed, no repeated labels.
///
/// A repeated label is reported as a conflict rather than silently
/// deduplicated, so a request can never claim fewer seats than it names.
pub fn validate_seat_request(seats: &[String]) -> AppResult<()> {
    if seats.is_empty() {
        return Err(AppError::ValidationError(
            "Selected seats must be a non-empty array".into(),
        ));
    }

    if seats.len() > MAX_SEATS_PER_BOOKING {
        return Err(AppError::ValidationError(format!(
            "Cannot book more than {} seats at once",
            MAX_SEATS_PER_BOOKING
        )));
    }

    let invalid: Vec<String> = seats
        .iter()
        .filter(|seat| !is_seat_label(seat))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::InvalidSeatFormat { labels: invalid });
    }

    let mut seen = HashSet::new();
    let repeated: Vec<String> = seats
        .iter()
        .filter(|seat| !seen.insert(seat.as_str()))
        .cloned()
        .collect();
    if !repeated.is_empty() {
        return Err(AppError::SeatsAlreadyTaken { seats: repeated });
    }

    Ok(())
}

// One uppercase ASCII letter followed by one or more digits, e.g. "A1".
fn is_seat_label(label: &str) -> bool {
    let mut chars = label.chars();
    let row = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    let number = chars.as_str();
    row.is_ascii_uppercase() && !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit())
}

/// Checks a requested seat set against the current occupancy of a showtime.
///
/// Capacity is checked first, then the exact intersection, so a caller that
/// lost a seat gets told which one even when capacity alone would also have
/// rejected the request the other way around.
pub fn check_against_ledger(
    capacity: i32,
    occupied: &[String],
    requested: &[String],
) -> AppResult<()> {
    let occupied: HashSet<&str> = occupied.iter().map(String::as_str).collect();
    let available = capacity as i64 - occupied.len() as i64;

    if requested.len() as i64 > available {
        return Err(AppError::InsufficientCapacity {
            available: available.max(0),
            requested: requested.len(),
        });
    }

    let taken: Vec<String> = requested
        .iter()
        .filter(|seat| occupied.contains(seat.as_str()))
        .cloned()
        .collect();
    if !taken.is_empty() {
        return Err(AppError::SeatsAlreadyTaken { seats: taken });
    }

    Ok(())
}
