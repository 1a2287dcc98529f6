//! Progress bar display for the install pass

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display over the module install sequence
pub struct InstallProgress {
    module_pb: ProgressBar,
}

impl InstallProgress {
    /// Create a new progress display with the total install-call count
    pub fn new(total_installs: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let module_pb = ProgressBar::new(total_installs);
        module_pb.set_style(style);

        Self { module_pb }
    }

    /// A display that draws nothing; used by unit tests and quiet paths
    pub fn hidden() -> Self {
        Self {
            module_pb: ProgressBar::hidden(),
        }
    }

    /// Update to show the module currently being installed
    pub fn update_module(&self, name: &str) {
        self.module_pb.set_message(name.to_string());
    }

    /// Increment module progress
    pub fn inc_module(&self) {
        self.module_pb.inc(1);
    }

    /// Finish the display
    pub fn finish(&self) {
        self.module_pb.finish_and_clear();
    }

    /// Abandon on error
    pub fn abandon(&self) {
        self.module_pb.abandon();
    }
}
