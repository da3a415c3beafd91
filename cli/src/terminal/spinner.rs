use std::time::Duration;

use colored::*;
use indicatif::ProgressStyle;
use tagscan_common::config::ScanMode;
use tagscan_common::scanning::ProgressState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const FRAME_INTERVAL: Duration = Duration::from_millis(120);
const PHRASE_EVERY: usize = 16;

const CENSUS_TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
    "█████",
];

const VALIDATION_TICKS: &[&str] = &[
    "(=ↀωↀ=)",
    "(=ↀωↀ=)✧",
    "(=^･ω･^=)",
    "(=｀ω´=)",
    "(=^‥^=)",
    "(=ↀωↀ=)✓",
];

const CENSUS_PHRASES: &[&str] = &["Knocking on hosts", "Reading model lists"];
const VALIDATION_PHRASES: &[&str] = &[
    "Sniffing nodes",
    "Double-checking answers",
    "Tidying the catch",
];

fn style_for(mode: ScanMode) -> ProgressStyle {
    let ticks = match mode {
        ScanMode::Census => CENSUS_TICKS,
        ScanMode::Validation => VALIDATION_TICKS,
    };
    ProgressStyle::with_template("{spinner:.blue} {msg} {bar:24.cyan/blue} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(ticks)
        .progress_chars("█▓░")
}

pub fn progress_message(mode: ScanMode, state: &ProgressState, frame: usize) -> String {
    let phrases = match mode {
        ScanMode::Census => CENSUS_PHRASES,
        ScanMode::Validation => VALIDATION_PHRASES,
    };
    let phrase = phrases[(frame / PHRASE_EVERY) % phrases.len()];
    format!(
        "{}... {}",
        phrase,
        format!("{} models", state.models_found).green().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}

/// Renders progress snapshots until the publishing side of `rx` is dropped.
///
/// With `-qq` nothing is drawn; the task only drains the channel.
pub fn spawn_progress_sink(
    mut rx: watch::Receiver<ProgressState>,
    mode: ScanMode,
    q_level: u8,
) -> JoinHandle<()> {
    if q_level > 1 {
        return tokio::spawn(async move { while rx.changed().await.is_ok() {} });
    }

    let span = info_span!("scan");
    span.pb_set_style(&style_for(mode));

    tokio::spawn(
        async move {
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            let mut frame: usize = 0;

            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = ticker.tick() => frame = frame.wrapping_add(1),
                }

                let state = *rx.borrow_and_update();
                let span = Span::current();
                span.pb_set_length(state.total as u64);
                span.pb_set_position(state.completed as u64);
                span.pb_set_message(&progress_message(mode, &state, frame));
            }
        }
        .instrument(span),
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
