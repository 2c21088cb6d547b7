use crate::domain::protocol::message::{PortDesc, SwitchMessage};
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::utils::id::{ConnectionId, Dpid};
use crate::error::{Error, Result};

/// One managed switch. Outlives its connections: a disconnected switch keeps its record and
/// gets a new connection handle when it comes back.
#[derive(Debug)]
pub struct Switch {
    pub dpid: Dpid,
    connection: Option<Box<dyn SwitchConnection>>,
    ports: Vec<PortDesc>,
    connected_at_ms: Option<i64>,
}

impl Switch {
    pub fn new(dpid: Dpid) -> Self {
        Self { dpid, connection: None, ports: Vec::new(), connected_at_ms: None }
    }

    /// Binds a new connection, releasing any previous one first.
    pub fn connect(&mut self, connection: Box<dyn SwitchConnection>, ports: Vec<PortDesc>, now_ms: i64) {
        self.disconnect();
        log::debug!("Connect {} on connection {}.", self.dpid, connection.connection_id());
        self.connection = Some(connection);
        self.ports = ports;
        self.connected_at_ms = Some(now_ms);
    }

    /// Releases the connection handle.
    ///
    /// # Returns
    /// `false` if there was no connection to release.
    pub fn disconnect(&mut self) -> bool {
        match self.connection.take() {
            Some(connection) => {
                log::debug!("Disconnect {} from connection {}.", self.dpid, connection.connection_id());
                connection.close();
                self.connected_at_ms = None;
                true
            }
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection.as_ref().map(|connection| connection.connection_id())
    }

    pub fn ports(&self) -> &[PortDesc] {
        &self.ports
    }

    pub fn connected_at_ms(&self) -> Option<i64> {
        self.connected_at_ms
    }

    pub fn send(&self, message: SwitchMessage) -> Result<()> {
        match &self.connection {
            Some(connection) => connection.send(message),
            None => Err(Error::SwitchNotConnected(self.dpid)),
        }
    }
}
