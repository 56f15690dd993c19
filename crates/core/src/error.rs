use thiserror::Error;

use crate::types::SessionPhase;

/// Invalid transitions requested by the caller.
///
/// These are precondition violations, not runtime conditions: the session
/// rejects the call and leaves its state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the session is in {phase}")]
    NotPlaying {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error("cannot advance the level with {remaining} trains still queued")]
    QueueNotExhausted { remaining: usize },
}
