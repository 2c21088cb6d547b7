use std::fmt::Debug;

use crate::domain::protocol::message::SwitchMessage;
use crate::domain::utils::id::ConnectionId;
use crate::error::Result;

/// Outbound half of one live switch connection, handed over by the I/O layer on connect.
pub trait SwitchConnection: Debug + Send {
    /// Generation id of this connection. A reconnect of the same switch yields a new one.
    fn connection_id(&self) -> ConnectionId;

    fn send(&self, message: SwitchMessage) -> Result<()>;

    /// Stops delivering events from this connection to the controller.
    fn close(&self) {}
}
