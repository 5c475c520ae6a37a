use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for job orchestration events.
///
/// Use cases report stage timings, metrics and status through this trait so
/// each caller decides where the output goes.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. match rate, caption count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Log a degraded-but-recoverable condition, such as a fallback.
    fn warn(&mut self, message: &str);

    /// Emit an end-of-job summary. Default: no-op.
    fn summary(&self) {}
}

/// Runs `f`, recording its wall-clock time under `stage`.
pub fn timed<T>(logger: &mut dyn PipelineLogger, stage: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let result = f();
    logger.timing(stage, started.elapsed().as_secs_f64() * 1000.0);
    result
}

/// Logger that discards all events. Used by tests and library callers.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}

/// CLI logger: forwards messages to the `log` crate and keeps stage timings
/// and metrics for a summary at the end of the job.
pub struct StdoutPipelineLogger {
    stage_order: Vec<String>,
    timings: HashMap<String, f64>,
    metrics: HashMap<String, f64>,
    warnings: usize,
    start_time: Instant,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            stage_order: Vec::new(),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            warnings: 0,
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!("Job summary ({:.1}s total):", elapsed_ms / 1000.0)];

        for stage in &self.stage_order {
            let total_ms = self.timings[stage];
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("  {stage:10}: {total_ms:9.1}ms  ({pct:4.1}%)"));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            lines.push(format!("  {name}: {:.2}", self.metrics[name]));
        }

        if self.warnings > 0 {
            lines.push(format!("  warnings: {}", self.warnings));
        }

        Some(lines.join("\n"))
    }

    /// Total time recorded for a stage.
    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).copied()
    }

    /// Latest value recorded for a metric.
    pub fn metric_for(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        if !self.timings.contains_key(stage) {
            self.stage_order.push(stage.to_string());
        }
        *self.timings.entry(stage.to_string()).or_default() += duration_ms;
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        self.warnings += 1;
        log::warn!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
