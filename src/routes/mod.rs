pub mod health_route;
pub mod payment_route;
pub mod reservation_route;
pub mod showtime_route;
pub mod user_route;
