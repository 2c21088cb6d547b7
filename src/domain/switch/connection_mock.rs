use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::protocol::message::SwitchMessage;
use crate::domain::switch::connection::SwitchConnection;
use crate::domain::utils::id::{ConnectionId, Dpid};
use crate::error::{Error, Result};

/// Connection that records every message instead of writing it to a socket.
///
/// Clones share the recorded messages, so a test keeps one handle and gives a boxed clone
/// to the controller.
#[derive(Debug, Clone)]
pub struct RecordingConnection {
    dpid: Dpid,
    id: ConnectionId,
    sent: Arc<Mutex<Vec<SwitchMessage>>>,
    closed: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
}

impl RecordingConnection {
    pub fn new(dpid: Dpid, id: u64) -> Self {
        Self {
            dpid,
            id: ConnectionId::new(id),
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn boxed(&self) -> Box<dyn SwitchConnection> {
        Box::new(self.clone())
    }

    pub fn sent(&self) -> Vec<SwitchMessage> {
        self.sent.lock().expect("Mutex poisoned").clone()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take_sent(&self) -> Vec<SwitchMessage> {
        std::mem::take(&mut *self.sent.lock().expect("Mutex poisoned"))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Makes every following `send` fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SwitchConnection for RecordingConnection {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, message: SwitchMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::SendFailed { dpid: self.dpid, reason: "connection reset".to_string() });
        }
        self.sent.lock().expect("Mutex poisoned").push(message);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
