//! Progress display for cell composition

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static CELL_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] {{msg}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar over grid cells
///
/// Cloning shares the underlying bar, so workers on other threads can report
/// completed cells.
#[derive(Clone)]
pub struct CellProgress {
    bar: ProgressBar,
}

impl CellProgress {
    /// Visible progress bar
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(CELL_STYLE.clone());
        Self { bar }
    }

    /// Progress bar that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Reset the bar for a run over `cells` cells
    pub fn start(&self, cells: usize, label: &str) {
        self.bar.set_length(cells as u64);
        self.bar.set_position(0);
        self.bar.set_message(label.to_string());
    }

    /// Record one composed cell
    pub fn cell_done(&self) {
        self.bar.inc(1);
    }

    /// Cells completed so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Stop and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for CellProgress {
    fn default() -> Self {
        Self::new()
    }
}
