//! Per-video frame progress with automatic batching for large sets

use crate::io::configuration::{MAX_INDIVIDUAL_PROGRESS_BARS, PROGRESS_BAR_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

/// Progress display for a batch of videos
///
/// Up to [`MAX_INDIVIDUAL_PROGRESS_BARS`] videos get their own frame bar. Larger
/// batches add an overall bar counting completed videos, and the frame bars
/// roll over to the most recent videos.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    video_bars: Vec<ProgressBar>,
    /// (`name`, `frames_done`, `frame_count`) for every started video
    video_states: Vec<(String, usize, usize)>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static FRAME_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{msg}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{prefix}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Videos: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a manager drawing to the terminal
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Create a manager that draws nothing
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi_progress: MultiProgress::with_draw_target(target),
            batch_bar: None,
            video_bars: Vec::new(),
            video_states: Vec::new(),
        }
    }

    /// Create the bars for `video_count` videos
    pub fn initialize(&mut self, video_count: usize) {
        if video_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(video_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        for _ in 0..video_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let bar = ProgressBar::new(0);
            bar.set_style(FRAME_STYLE.clone());
            self.video_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Register video `index` with its frame count
    pub fn start_video(&mut self, index: usize, name: &str, frame_count: usize) {
        if index >= self.video_states.len() {
            self.video_states.resize(index + 1, (String::new(), 0, 0));
        }
        if let Some(state) = self.video_states.get_mut(index) {
            *state = (name.to_string(), 0, frame_count);
        }
        self.update_bars();
    }

    /// Report frames processed so far for video `index`
    pub fn update_frames(&mut self, index: usize, frames_done: usize) {
        if let Some(state) = self.video_states.get_mut(index) {
            state.1 = frames_done;
        }
        self.update_bars();
    }

    /// Mark video `index` as done
    pub fn complete_video(&mut self, index: usize) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(state) = self.video_states.get_mut(index) {
            state.0 = format!("✓ {}", state.0);
            state.1 = state.2;
        }
        self.update_bars();
    }

    /// Number of videos started
    pub fn started(&self) -> usize {
        self.video_states
            .iter()
            .filter(|(name, _, _)| !name.is_empty())
            .count()
    }

    /// Remove all bars from the terminal
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All videos processed");
        }
        let _ = self.multi_progress.clear();
    }

    // Show the most recently started videos on the available bars
    fn update_bars(&self) {
        let active: Vec<&(String, usize, usize)> = self
            .video_states
            .iter()
            .filter(|(name, _, _)| !name.is_empty())
            .collect();

        let start = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start..).unwrap_or(&[]);

        for (bar, (name, done, total)) in self.video_bars.iter().zip(visible) {
            bar.set_length(*total as u64);
            bar.set_position(*done as u64);
            let width = total.to_string().len();
            bar.set_message(format!("{done:>width$}/{total}"));
            bar.set_prefix(name.clone());
        }

        for bar in self.video_bars.iter().skip(visible.len()) {
            bar.set_length(0);
            bar.set_position(0);
            bar.set_message(String::new());
            bar.set_prefix(String::new());
        }
    }
}
