pub mod controller;
pub mod controller_config;
pub mod event_sink;
pub mod port_weight;
