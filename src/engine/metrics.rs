use std::fmt::Display;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// How much work one search did. Purely observational.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub states_explored: usize,
    pub states_generated: usize,
    #[serde(rename = "maxQueueSize")]
    pub peak_frontier: usize,
    pub rule_expansions: usize,
    pub terminal_attempts: usize,
    pub terminal_successes: usize,
    #[serde(rename = "parseTimeMs", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(as_millis(*elapsed))
}

fn as_millis(elapsed: Duration) -> f64 {
    elapsed.as_nanos() as f64 / 1_000_000.0
}

impl Metrics {
    pub(crate) fn record_explored(&mut self) {
        self.states_explored += 1;
    }

    pub(crate) fn record_generated(&mut self) {
        self.states_generated += 1;
    }

    pub(crate) fn record_expansion(&mut self) {
        self.rule_expansions += 1;
    }

    pub(crate) fn record_terminal_attempt(&mut self) {
        self.terminal_attempts += 1;
    }

    pub(crate) fn record_terminal_success(&mut self) {
        self.terminal_successes += 1;
    }

    pub(crate) fn observe_frontier(&mut self, size: usize) {
        self.peak_frontier = self.peak_frontier.max(size);
    }

    pub fn elapsed_ms(&self) -> f64 {
        as_millis(self.elapsed)
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "States explored:    {}", self.states_explored)?;
        writeln!(f, "States generated:   {}", self.states_generated)?;
        writeln!(f, "Peak frontier:      {}", self.peak_frontier)?;
        writeln!(f, "Rule expansions:    {}", self.rule_expansions)?;
        writeln!(f, "Terminal matches:   {}/{}", self.terminal_successes, self.terminal_attempts)?;
        write!(f, "Parse time:         {:.3} ms", as_millis(self.elapsed))
    }
}
