//! Value objects returned by the engine's operations.

use super::entities::{ParticipantId, TeamId};
use serde::Serialize;

/// A newly formed team, as handed to the notification layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamSummary {
    /// Team label.
    pub id: TeamId,
    /// Members in queue order; first is the lead.
    pub members: Vec<ParticipantId>,
}

/// Outcome of one matching round after persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// Teams created in this round, in creation order.
    pub created: Vec<TeamSummary>,
    /// Participants still waiting after the round.
    pub remaining: usize,
}

impl RoundReport {
    /// Total participants placed in this round.
    pub fn placed(&self) -> usize {
        self.created.iter().map(|t| t.members.len()).sum()
    }
}

/// Aggregate statistics over active teams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TeamStats {
    /// Number of active teams.
    pub active_teams: usize,
    /// Mean member count across active teams (0.0 when none).
    pub avg_size: f64,
}
