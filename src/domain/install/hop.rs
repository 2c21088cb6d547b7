use serde::{Deserialize, Serialize};

use crate::domain::utils::id::{Dpid, PortNo};

/// One switch on a resolved path with the ports the flow enters and leaves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hop {
    pub dpid: Dpid,
    pub in_port: PortNo,
    pub out_port: PortNo,
}

impl Hop {
    pub fn new(dpid: Dpid, in_port: PortNo, out_port: PortNo) -> Self {
        Self { dpid, in_port, out_port }
    }

    /// The same switch crossed in the opposite direction.
    pub fn reversed(&self) -> Hop {
        Hop { dpid: self.dpid, in_port: self.out_port, out_port: self.in_port }
    }
}
