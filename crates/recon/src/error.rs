use std::fmt;

use megaverse_client::ClientError;
use megaverse_core::TransitionError;

#[derive(Debug)]
pub enum ReconError {
    /// Goal endpoint answered with something other than a usable grid.
    GoalFetch(ClientError),
    /// Goal request never got a response.
    GoalUnreachable(String),
    /// Intent lifecycle violated. Indicates a bug in the dispatcher.
    InvalidTransition(TransitionError),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoalFetch(err) => write!(f, "goal fetch failed: {err}"),
            Self::GoalUnreachable(msg) => write!(f, "goal fetch failed: {msg}"),
            Self::InvalidTransition(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GoalFetch(err) => Some(err),
            Self::InvalidTransition(err) => Some(err),
            Self::GoalUnreachable(_) => None,
        }
    }
}

impl From<TransitionError> for ReconError {
    fn from(err: TransitionError) -> Self {
        Self::InvalidTransition(err)
    }
}

impl ReconError {
    /// True when the run never got a goal grid.
    pub fn is_goal_failure(&self) -> bool {
        matches!(self, Self::GoalFetch(_) | Self::GoalUnreachable(_))
    }
}
