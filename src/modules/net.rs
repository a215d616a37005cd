//! Wireless link probe and reassociation.

use crate::config::NetworkConfig;
use crate::relay::NetworkLink;
use log::{debug, error, info, warn};
use std::fs;
use std::process::{Child, Command};

/// Checks the kernel's view of the interface and, when the link is gone,
/// kicks off the configured reassociation command without waiting on it.
pub struct WirelessLink {
    interface: String,
    reassociate_cmd: Option<String>,
    last_attempt: Option<Child>,
}

impl WirelessLink {
    pub fn new(config: &NetworkConfig) -> Self {
        WirelessLink {
            interface: config.interface.clone(),
            reassociate_cmd: config.reassociate_cmd.clone(),
            last_attempt: None,
        }
    }
}

impl NetworkLink for WirelessLink {
    fn is_up(&mut self) -> bool {
        let path = format!("/sys/class/net/{}/operstate", self.interface);
        match fs::read_to_string(&path) {
            Ok(state) => state.trim() == "up",
            Err(e) => {
                debug!("could not read {}: {}", path, e);
                false
            }
        }
    }

    fn reassociate(&mut self) {
        // Reap the previous attempt if it finished; never wait on it.
        if let Some(mut child) = self.last_attempt.take() {
            if matches!(child.try_wait(), Ok(None)) {
                debug!("reassociation still in progress");
                self.last_attempt = Some(child);
                return;
            }
        }

        let Some(cmd) = &self.reassociate_cmd else {
            warn!("network down and no reassociate command configured");
            return;
        };

        match Command::new("sh").arg("-c").arg(cmd).spawn() {
            Ok(child) => {
                info!("requested network reassociation");
                self.last_attempt = Some(child);
            }
            Err(e) => error!("failed to run reassociate command: {}", e),
        }
    }
}
