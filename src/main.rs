#[macro_use]
extern crate rocket;
extern crate rocket_okapi;

use dotenv::dotenv;
use movie_reservation_system::db::Database;
use movie_reservation_system::routes;
use movie_reservation_system::services::catalog_service::CatalogService;
use movie_reservation_system::services::notification_service::{LogNotifier, Notifier};
use movie_reservation_system::services::payment_service::{
    HmacPaymentGateway, PaymentGateway, PaymentService,
};
use movie_reservation_system::services::reservation_service::ReservationService;
use movie_reservation_system::services::scheduler_service::SchedulerService;
use movie_reservation_system::services::user_service::UserService;
use movie_reservation_system::store::{MySqlReservationStore, ReservationStore};
use movie_reservation_system::swagger::swagger_ui;
use rocket::fairing::AdHoc;
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::make_swagger_ui;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[launch]
async fn rocket() -> _ {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Connect to the database
    let database = Database::new(
        &std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
    )
    .await
    .expect("Failed to connect to database");
    let pool = database.pool.clone();

    Database::init_schema(&pool)
        .await
        .expect("Failed to initialize database schema");

    let store: Arc<dyn ReservationStore> = Arc::new(MySqlReservationStore::new(pool.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(HmacPaymentGateway::from_env());

    let user_service = UserService::new(pool.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let reservation_service = ReservationService::new(Arc::clone(&store), Arc::clone(&notifier));
    let payment_service = PaymentService::new(gateway, Arc::clone(&store), Arc::clone(&notifier));

    // Tick-driven reminder sweep, decoupled from request handling
    let reminder_interval = std::env::var("REMINDER_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(3600);
    SchedulerService::new(
        Arc::clone(&store),
        Arc::clone(&notifier),
        Duration::from_secs(reminder_interval),
    )
    .start();

    rocket::build()
        .manage(pool)
        .manage(user_service)
        .manage(catalog_service)
        .manage(reservation_service)
        .manage(payment_service)
        .mount(
            "/api",
            openapi_get_routes![
                routes::user_route::register,
                routes::user_route::login,
                routes::reservation_route::create_reservation,
                routes::reservation_route::get_my_reservations,
                routes::reservation_route::get_reservation,
                routes::reservation_route::cancel_reservation,
                routes::reservation_route::get_showtime_reservations,
                routes::payment_route::create_payment_order,
                routes::payment_route::verify_payment,
                routes::showtime_route::create_theater,
                routes::showtime_route::create_hall,
                routes::showtime_route::create_movie,
                routes::showtime_route::create_showtime,
                routes::showtime_route::get_movie_showtimes,
                routes::showtime_route::deactivate_showtime,
                routes::health_route::health,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}
