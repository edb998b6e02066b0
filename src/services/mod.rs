pub mod allocation;
pub mod catalog_service;
pub mod notification_service;
pub mod payment_service;
pub mod reservation_service;
pub mod scheduler_service;
pub mod user_service;
