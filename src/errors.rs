use thiserror::Error;

/// Failure modes callers are expected to branch on. Anything transport-shaped
/// from the stats provider is folded into `DataUnavailable` at the boundary.
#[derive(Debug, Error)]
pub enum PropError {
    /// The player has no logged games for the requested season.
    #[error("empty game log: no games recorded this season")]
    EmptyLog,

    /// Fewer completed games than the rolling window needs.
    #[error("insufficient history: {got} games logged, {need} required")]
    InsufficientHistory { got: usize, need: usize },

    /// The training dataset lacks one or more required feature columns.
    /// Fatal at startup; there is no partial-feature fallback.
    #[error("training dataset missing feature columns: {}", missing.join(", "))]
    MissingFeatureColumns { missing: Vec<String> },

    /// An external lookup failed or returned an unusable payload.
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] anyhow::Error),
}

impl PropError {
    /// How many more games the player needs before a prediction is possible.
    pub fn games_short(&self) -> Option<usize> {
        match self {
            PropError::InsufficientHistory { got, need } => Some(need.saturating_sub(*got)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropError;

    #[test]
    fn games_short_only_for_insufficient_history() {
        let err = PropError::InsufficientHistory { got: 3, need: 5 };
        assert_eq!(err.games_short(), Some(2));
        assert_eq!(PropError::EmptyLog.games_short(), None);
    }

    #[test]
    fn missing_columns_message_lists_names() {
        let err = PropError::MissingFeatureColumns {
            missing: vec!["PTS_L5".to_string(), "REB_L5".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("PTS_L5"));
        assert!(msg.contains("REB_L5"));
    }
}
