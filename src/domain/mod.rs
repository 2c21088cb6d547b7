pub mod clock;
pub mod controller;
pub mod host;
pub mod install;
pub mod protocol;
pub mod switch;
pub mod topology;
pub mod utils;
