pub mod api;
pub mod completer;
pub mod config;
pub mod dashboard;
pub mod table_display;
pub mod utils;
