pub mod connection;
pub mod connection_mock;
pub mod switch;
pub mod switch_registry;
