use std::io::{self, Write};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICKS: &[&str] = &[
    "\u{2802}", "\u{2816}", "\u{2834}", "\u{2830}", "\u{2860}", "\u{28e0}", "\u{28c0}", "\u{2880}",
];

/// Shared draw target for every bar of a run. Hidden in JSON mode.
pub fn multi(hidden: bool) -> MultiProgress {
    if hidden {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    } else {
        MultiProgress::new()
    }
}

/// Log sink that clears active bars before writing, so log lines never
/// interleave with a half-drawn spinner.
pub struct LogWriter {
    progress: MultiProgress,
}

impl LogWriter {
    pub fn new(progress: MultiProgress) -> Self {
        Self { progress }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.progress.suspend(|| io::stderr().write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.progress.suspend(|| io::stderr().flush())
    }
}

pub fn spinner(progress: &MultiProgress, message: &'static str) -> ProgressBar {
    let sp = progress.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(TICKS)
        .template("{spinner} {msg}")
    {
        sp.set_style(style);
    }
    sp.set_message(message);
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Bar advanced once per harvested repository.
pub fn harvest_bar(progress: &MultiProgress, repositories: usize) -> ProgressBar {
    let bar = progress.add(ProgressBar::new(repositories as u64));
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{bar:30.cyan/blue} {pos}/{len} {msg}")
        .map(|s| s.progress_chars("=> "))
    {
        bar.set_style(style);
    }
    bar
}
