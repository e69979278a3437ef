use std::collections::BTreeMap;
use std::time::Instant;

use crate::overlay::domain::detection_registry::ReconcileReport;

/// Observer for per-frame session events.
///
/// Keeps the frame loop free of any particular output mechanism; the CLI
/// logs through the `log` crate, tests use the silent logger.
pub trait SessionLogger: Send {
    /// Outcome of one reconciliation pass.
    fn frame(&mut self, index: usize, report: &ReconcileReport);

    /// How long a named stage took this frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Human-readable status message.
    fn info(&mut self, message: &str);

    /// End-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: usize, _report: &ReconcileReport) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs overlay lifecycle changes as they happen and aggregates per-stage
/// timings and overlay counts for a closing summary.
pub struct StdoutSessionLogger {
    timings: BTreeMap<String, Vec<f64>>,
    frames: usize,
    created: usize,
    removed: usize,
    refreshed: usize,
    peak_live: usize,
    start_time: Instant,
}

impl StdoutSessionLogger {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
            frames: 0,
            created: 0,
            removed: 0,
            refreshed: 0,
            peak_live: 0,
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` before the first frame.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![
            format!(
                "Session summary ({} frames, {:.1}s total):",
                self.frames,
                elapsed_ms / 1000.0
            ),
            format!(
                "  overlays: {} created, {} removed, {} refreshed, peak {} live",
                self.created, self.removed, self.refreshed, self.peak_live
            ),
        ];

        for (stage, durations) in &self.timings {
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.2}ms  max {max_ms:6.2}ms"
            ));
        }

        if elapsed_ms > 0.0 {
            let fps = self.frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }
        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn frame(&mut self, index: usize, report: &ReconcileReport) {
        self.frames += 1;
        self.created += report.created;
        self.removed += report.removed;
        self.refreshed += report.refreshed;
        self.peak_live = self.peak_live.max(report.live);
        if !report.is_noop() {
            log::info!(
                "Frame {index}: +{} -{} ~{} ({} live)",
                report.created,
                report.removed,
                report.refreshed,
                report.live
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
