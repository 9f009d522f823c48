//! Meditation Domain Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MeditationError {
    #[error("No heuristic entry for duration {duration} and guidance {guidance}")]
    MissingHeuristic {
        duration: &'static str,
        guidance: &'static str,
    },

    #[error("Invalid heuristic entry for {duration}/{guidance}: {reason}")]
    InvalidHeuristic {
        duration: &'static str,
        guidance: &'static str,
        reason: String,
    },
}
