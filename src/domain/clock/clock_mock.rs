use crate::domain::clock::clock::{ControllerClock, SharedClock};

use std::sync::{Arc, RwLock};

/// Manually advanced clock. Clones share the same time, so a test can keep one handle and
/// hand another to the controller.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    time_ms: Arc<RwLock<i64>>,
}

impl MockClock {
    pub fn new(time_ms: i64) -> MockClock {
        MockClock { time_ms: Arc::new(RwLock::new(time_ms)) }
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        *self.time_ms.write().expect("RwLock poisoned") += delta_ms;
    }
}

impl ControllerClock for MockClock {
    fn get_current_time_in_ms(&self) -> i64 {
        *self.time_ms.read().expect("RwLock poisoned")
    }

    fn clone_box(&self) -> SharedClock {
        SharedClock(Arc::new(self.clone()))
    }
}
