pub mod app;
pub mod db_handler;
pub mod error;
pub mod service_handler;
