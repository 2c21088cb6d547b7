pub mod codec;
pub mod controller_actor;
pub mod listener;
pub mod protocol;
pub mod session;
