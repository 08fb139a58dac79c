// src/errors.rs

//! Structured stage failures and the shared failure channel.
//!
//! Every stage failure, whatever the class, is reported through
//! [`report_stage_failure`] as {stage identity, asset class, cause}. Whether
//! the runtime then continues or aborts is a single configuration choice
//! ([`FailurePolicy`]), not a per-stage special case.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::error;

use crate::stage::StageId;

/// Concrete failure causes raised inside stages.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("i/o error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external tool `{cmd}` exited with status {code}: {stderr}")]
    Tool {
        cmd: String,
        code: i32,
        stderr: String,
    },

    #[error("invalid glob pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl StageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// What the runtime does after a stage failure.
///
/// - `Continue` (default): the failure is logged and the run goes on; only
///   the failed stage's dependent subtree is skipped for that pass. A watch
///   session stays alive.
/// - `Abort`: the runtime stops with an error on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Continue,
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(FailurePolicy::Continue),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(format!(
                "invalid on_error policy: {other} (expected \"continue\" or \"abort\")"
            )),
        }
    }
}

/// The shared failure sink: logs the failing stage's identity, its asset
/// class and the cause. Callers signal completion separately, so composed
/// runs and watch subscriptions keep operating.
pub fn report_stage_failure(stage: StageId, cause: &anyhow::Error) {
    match stage.class() {
        Some(class) => {
            error!(stage = %stage, class = %class, error = ?cause, "stage failed");
        }
        None => {
            error!(stage = %stage, error = ?cause, "stage failed");
        }
    }
}
