#![deny(warnings)]
#![warn(clippy::pedantic)]

use std::time::Duration;
use sysinfo::{Pid, System};
use tracing::info;

/// Periodic diagnostic report of the current process's resident and virtual
/// memory, in megabytes, for human-side correlation with the external
/// monitor's own readings. Never machine-parsed here.
pub struct MemoryReporter {
    handle: tokio::task::JoinHandle<()>,
}

impl MemoryReporter {
    #[must_use]
    pub fn spawn(interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let pid = Pid::from_u32(std::process::id());
            let mut sys = System::new();
            loop {
                if sys.refresh_process(pid) {
                    if let Some(process) = sys.process(pid) {
                        let resident_mb = process.memory() / (1024 * 1024);
                        let virtual_mb = process.virtual_memory() / (1024 * 1024);
                        info!(resident_mb, virtual_mb, "process memory");
                    }
                }
                tokio::time::sleep(interval).await;
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}
