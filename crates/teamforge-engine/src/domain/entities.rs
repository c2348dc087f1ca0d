//! Core domain entities for the Team Formation Engine.
//!
//! Every record persisted in the state document is an explicit typed struct,
//! validated by serde at the store boundary. The aggregate root is
//! [`StateDocument`]: participants, the waiting queue, teams, questions, and
//! the sequence counters, all saved and loaded as one unit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque participant identifier (e.g. a messenger user id).
pub type ParticipantId = u64;

/// Team label of the form `T-<n>`, allocated from the team counter.
pub type TeamId = String;

/// Question label of the form `Q-<n>`, allocated from the question counter.
pub type QuestionId = String;

/// Participant lifecycle status.
///
/// State machine:
/// ```text
/// [WAITING] ──matched──→ [TEAMED] ──disband/removal──→ [WAITING]
/// ```
///
/// A participant record is created on first registration and never deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// In (or eligible for) the waiting queue.
    #[default]
    Waiting,
    /// Member of an active team.
    Teamed,
}

/// A registered participant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable identifier.
    pub id: ParticipantId,
    /// Current lifecycle status.
    pub status: ParticipantStatus,
    /// Back-reference to the active team while status is `Teamed`.
    #[serde(default)]
    pub team: Option<TeamId>,
}

impl Participant {
    /// Creates a fresh record in the waiting state.
    pub fn waiting(id: ParticipantId) -> Self {
        Self {
            id,
            status: ParticipantStatus::Waiting,
            team: None,
        }
    }

    /// Returns true if the participant is waiting for a team.
    pub fn is_waiting(&self) -> bool {
        self.status == ParticipantStatus::Waiting
    }
}

/// Team lifecycle status.
///
/// Archived teams are retained as audit records, never deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    /// Formed and current.
    Active,
    /// Disbanded or emptied; record kept for audit.
    Archived,
}

/// A formed team.
///
/// Member order is the order participants held in the queue at matching
/// time; the first member is the designated lead. While active, the member
/// count stays within `base ..= base + elastic`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Sequence-based label, e.g. `T-12`.
    pub id: TeamId,
    /// Members in queue order; first is the lead.
    pub members: Vec<ParticipantId>,
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// Lifecycle status.
    pub status: TeamStatus,
}

impl Team {
    /// Returns true if the team is active.
    pub fn is_active(&self) -> bool {
        self.status == TeamStatus::Active
    }

    /// The designated lead (first member), if any.
    pub fn lead(&self) -> Option<ParticipantId> {
        self.members.first().copied()
    }
}

/// A question submitted by a participant, answered later by a moderator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Sequence-based label, e.g. `Q-3`.
    pub id: QuestionId,
    /// Who asked.
    pub participant: ParticipantId,
    /// Question text.
    pub text: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// Whether an answer has been recorded.
    pub answered: bool,
    /// The recorded answer, once given.
    #[serde(default)]
    pub answer: Option<String>,
    /// Who answered.
    #[serde(default)]
    pub answered_by: Option<ParticipantId>,
    /// RFC3339 answer timestamp.
    #[serde(default)]
    pub answered_at: Option<String>,
}

/// Monotonic sequence counters owned by the state document.
///
/// Incremented in the same load-mutate-save cycle as the entity they label,
/// so identifiers are unique across the document's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Number of teams ever created.
    #[serde(default)]
    pub team_seq: u64,
    /// Number of questions ever created.
    #[serde(default)]
    pub question_seq: u64,
}

/// The aggregate root persisted by the state store.
///
/// All mutations follow load -> mutate in memory -> save atomically; partial
/// documents are never observable (the store's atomic-swap contract).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    /// All registered participants, keyed by id.
    #[serde(default)]
    pub participants: HashMap<ParticipantId, Participant>,
    /// FIFO waiting queue of participant ids, no duplicates.
    #[serde(default)]
    pub queue: Vec<ParticipantId>,
    /// All teams ever formed, keyed by label.
    #[serde(default)]
    pub teams: HashMap<TeamId, Team>,
    /// Sequence counters.
    #[serde(default)]
    pub counters: Counters,
    /// Participant questions, keyed by label.
    #[serde(default)]
    pub questions: HashMap<QuestionId, Question>,
}

impl StateDocument {
    /// Appends `id` to the queue if absent. Returns whether it was appended.
    ///
    /// Existing entries keep their order, so repeated enqueues are no-ops.
    pub fn enqueue(&mut self, id: ParticipantId) -> bool {
        if self.queue.contains(&id) {
            return false;
        }
        self.queue.push(id);
        true
    }

    /// Prepends a batch to the queue, preserving the batch's sub-order.
    ///
    /// Ids already queued are skipped. Used when disbanded members regain
    /// priority over the existing queue.
    pub fn enqueue_front(&mut self, ids: &[ParticipantId]) {
        for &id in ids.iter().rev() {
            if !self.queue.contains(&id) {
                self.queue.insert(0, id);
            }
        }
    }

    /// Removes `id` from the queue. Returns whether it was present.
    pub fn remove_from_queue(&mut self, id: ParticipantId) -> bool {
        match self.queue.iter().position(|&q| q == id) {
            Some(pos) => {
                self.queue.remove(pos);
                true
            }
            None => false,
        }
    }

    /// 0-based queue position of `id`, if queued.
    pub fn position_of(&self, id: ParticipantId) -> Option<usize> {
        self.queue.iter().position(|&q| q == id)
    }

    /// Allocates the next team label, bumping the team counter.
    pub fn next_team_id(&mut self) -> TeamId {
        self.counters.team_seq += 1;
        format!("T-{}", self.counters.team_seq)
    }

    /// Allocates the next question label, bumping the question counter.
    pub fn next_question_id(&mut self) -> QuestionId {
        self.counters.question_seq += 1;
        format!("Q-{}", self.counters.question_seq)
    }

    /// Fetches the participant record for `id`, creating a waiting record if
    /// this is the first time the id is seen.
    pub fn participant_mut(&mut self, id: ParticipantId) -> &mut Participant {
        self.participants
            .entry(id)
            .or_insert_with(|| Participant::waiting(id))
    }

    /// Iterator over currently active teams.
    pub fn active_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values().filter(|t| t.is_active())
    }
}
