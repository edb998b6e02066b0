pub mod hall;
pub mod movie;
pub mod reservation;
pub mod showtime;
pub mod theater;
pub mod user;
