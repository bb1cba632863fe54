use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting observer for use-case orchestration.
///
/// Use cases report stage timings and status lines here instead of writing
/// to a particular sink, so callers decide what gets printed.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events. Used by tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Forwards messages to the `log` facade and collects per-stage timings
/// for a summary at the end of the run.
pub struct LogPipelineLogger {
    stages: Vec<(String, f64)>,
    start_time: Instant,
    messages: Vec<String>,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            start_time: Instant::now(),
            messages: Vec::new(),
        }
    }

    /// Formatted summary in stage order, or `None` if nothing was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.stages.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut totals: HashMap<&str, f64> = HashMap::new();
        let mut order = Vec::new();
        for (stage, ms) in &self.stages {
            let entry = totals.entry(stage.as_str()).or_insert_with(|| {
                order.push(stage.as_str());
                0.0
            });
            *entry += ms;
        }

        let mut lines = vec![format!("Run summary ({:.2}s total):", elapsed_ms / 1000.0)];
        for stage in order {
            let total_ms = totals[stage];
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("  {stage:12}: {total_ms:8.1}ms  ({pct:4.1}%)"));
        }
        Some(lines.join("\n"))
    }

    /// Total time recorded for a stage.
    pub fn total_for(&self, stage: &str) -> Option<f64> {
        let mut found = false;
        let total = self
            .stages
            .iter()
            .filter(|(s, _)| s == stage)
            .inspect(|_| found = true)
            .map(|(_, ms)| ms)
            .sum();
        found.then_some(total)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        log::debug!("{stage} took {duration_ms:.1}ms");
        self.stages.push((stage.to_string(), duration_ms));
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.timing("locate", 5.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_accumulates_per_stage() {
        let mut logger = LogPipelineLogger::new();
        logger.timing("composite", 20.0);
        logger.timing("composite", 30.0);
        logger.timing("locate", 5.0);

        assert_relative_eq!(logger.total_for("composite").unwrap(), 50.0);
        assert_relative_eq!(logger.total_for("locate").unwrap(), 5.0);
        assert!(logger.total_for("refine").is_none());
    }

    #[test]
    fn test_summary_lists_stages_in_first_seen_order() {
        let mut logger = LogPipelineLogger::new();
        logger.timing("read", 1.0);
        logger.timing("locate", 2.0);
        logger.timing("read", 1.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Run summary"));
        let read = summary.find("read").unwrap();
        let locate = summary.find("locate").unwrap();
        assert!(read < locate);
        assert_eq!(summary.lines().count(), 3);
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogPipelineLogger::new().summary_string().is_none());
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = LogPipelineLogger::default();
        logger.info("wrote out.png");
        assert_eq!(logger.messages(), ["wrote out.png".to_string()]);
    }
}
