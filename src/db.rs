use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

// Database connection manager
pub struct Database {
    pub pool: MySqlPool,
}

impl Database {
    // Create a new database connection pool
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    // Get a reference to the connection pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the schema if it does not exist yet.
    ///
    /// The unique key on seat_claims (showtime_id, seat_label) is the
    /// storage-layer enforcement of the seat-uniqueness invariant; claims for
    /// cancelled reservations are deleted, which is what frees the seats.
    pub async fn init_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
        let tables = vec![
            "CREATE TABLE IF NOT EXISTS users (
                id CHAR(36) NOT NULL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL,
                password CHAR(60) NOT NULL,
                role ENUM('user', 'admin') DEFAULT 'user' NOT NULL,
                CONSTRAINT users_email_uindex UNIQUE (email)
            )",
            "CREATE TABLE IF NOT EXISTS theaters (
                id CHAR(36) NOT NULL PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                address VARCHAR(255) NOT NULL,
                city VARCHAR(100) NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS halls (
                id CHAR(36) NOT NULL PRIMARY KEY,
                theater_id CHAR(36) NOT NULL,
                name VARCHAR(50) NOT NULL,
                format_type VARCHAR(20) NOT NULL,
                total_seats INT NOT NULL,
                CONSTRAINT halls_theater_id_fk
                    FOREIGN KEY (theater_id) REFERENCES theaters(id)
                    ON DELETE CASCADE
            )",
            "CREATE TABLE IF NOT EXISTS movies (
                id CHAR(36) NOT NULL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                genre VARCHAR(100) NOT NULL,
                duration_minutes INT NOT NULL,
                certification VARCHAR(10) NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS showtimes (
                id CHAR(36) NOT NULL PRIMARY KEY,
                movie_id CHAR(36) NOT NULL,
                hall_id CHAR(36) NOT NULL,
                show_date DATE NOT NULL,
                show_time TIME NOT NULL,
                base_price DECIMAL(10,2) NOT NULL,
                capacity INT NOT NULL,
                is_active BOOLEAN DEFAULT TRUE NOT NULL,
                CONSTRAINT showtimes_movie_id_fk
                    FOREIGN KEY (movie_id) REFERENCES movies(id)
                    ON DELETE CASCADE,
                CONSTRAINT showtimes_hall_id_fk
                    FOREIGN KEY (hall_id) REFERENCES halls(id)
                    ON DELETE CASCADE
            )",
            "CREATE TABLE IF NOT EXISTS reservations (
                id CHAR(36) NOT NULL PRIMARY KEY,
                user_id CHAR(36) NOT NULL,
                showtime_id CHAR(36) NOT NULL,
                seats JSON NOT NULL,
                total_amount DECIMAL(10,2) NOT NULL,
                status ENUM('pending', 'confirmed', 'cancelled') DEFAULT 'pending' NOT NULL,
                payment_status ENUM('pending', 'paid', 'refunded') DEFAULT 'pending' NOT NULL,
                reminder_sent BOOLEAN DEFAULT FALSE NOT NULL,
                created_at DATETIME NOT NULL,
                CONSTRAINT reservations_user_id_fk
                    FOREIGN KEY (user_id) REFERENCES users(id)
                    ON DELETE CASCADE,
                CONSTRAINT reservations_showtime_id_fk
                    FOREIGN KEY (showtime_id) REFERENCES showtimes(id)
            )",
            "CREATE TABLE IF NOT EXISTS seat_claims (
                showtime_id CHAR(36) NOT NULL,
                seat_label VARCHAR(8) NOT NULL,
                reservation_id CHAR(36) NOT NULL,
                PRIMARY KEY (showtime_id, seat_label),
                CONSTRAINT seat_claims_showtime_id_fk
                    FOREIGN KEY (showtime_id) REFERENCES showtimes(id),
                CONSTRAINT seat_claims_reservation_id_fk
                    FOREIGN KEY (reservation_id) REFERENCES reservations(id)
                    ON DELETE CASCADE
            )",
        ];

        for create_sql in tables {
            sqlx::query(create_sql).execute(pool).await?;
        }

        Ok(())
    }
}
