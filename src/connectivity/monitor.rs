//! Online/offline state tracking

use tracing::info;

/// Change produced by a network signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Device came back online
    Online,
    /// Device lost its connection
    Offline,
    /// Signal repeated the current state
    Unchanged,
}

/// Tracks whether the device is online
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    online: bool,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityMonitor {
    /// Create a monitor with the initial device state
    pub fn new(online: bool) -> Self {
        Self { online }
    }

    /// Whether the device is online
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Record a network signal
    pub fn signal(&mut self, online: bool) -> Transition {
        if self.online == online {
            return Transition::Unchanged;
        }
        self.online = online;
        if online {
            info!("Connectivity restored");
            Transition::Online
        } else {
            info!("Connectivity lost");
            Transition::Offline
        }
    }
}
