//! Command lifecycle events for renders, merges and publishes.
//!
//! Every command gets a correlation id when it begins; the start, any notes
//! and the outcome are emitted under one tracing target so a log filter can
//! follow a single render end to end.

use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;

const TELEMETRY_TARGET: &str = "kinship::events::telemetry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    RenderScene,
    MergeDrafts,
    PublishSnapshot,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::RenderScene => "RenderScene",
            Command::MergeDrafts => "MergeDrafts",
            Command::PublishSnapshot => "PublishSnapshot",
        };
        f.write_str(name)
    }
}

/// An in-flight command. Consumed by `finish` or `fail`.
#[derive(Debug)]
pub struct CommandSpan {
    command: Command,
    correlation_id: String,
    started: Instant,
}

impl CommandSpan {
    pub fn begin(command: Command) -> Self {
        let span = Self {
            command,
            correlation_id: Uuid::new_v4().to_string(),
            started: Instant::now(),
        };
        info!(
            target: TELEMETRY_TARGET,
            command = %span.command,
            correlation_id = %span.correlation_id,
            "command_start"
        );
        span
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Free-form detail (counts, sizes) attached to this command.
    pub fn note(&self, context: &str) {
        debug!(
            target: TELEMETRY_TARGET,
            command = %self.command,
            correlation_id = %self.correlation_id,
            context = %context,
            "command_context"
        );
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        info!(
            target: TELEMETRY_TARGET,
            command = %self.command,
            correlation_id = %self.correlation_id,
            duration_ms = elapsed.as_millis() as u64,
            "command_success"
        );
        elapsed
    }

    pub fn fail(self, reason: &str) -> Duration {
        let elapsed = self.started.elapsed();
        error!(
            target: TELEMETRY_TARGET,
            command = %self.command,
            correlation_id = %self.correlation_id,
            duration_ms = elapsed.as_millis() as u64,
            error = %reason,
            "command_failure"
        );
        elapsed
    }
}
