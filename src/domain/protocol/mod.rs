pub mod flow_match;
pub mod frame;
pub mod message;
