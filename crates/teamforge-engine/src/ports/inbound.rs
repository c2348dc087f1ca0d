//! Inbound (driving) port: the engine API consumed by collaborators.
//!
//! Registration and leave flows use the queue operations; the admin trigger
//! and the scheduler share `run_matching_round`; status surfaces read the
//! queries. Every mutating method is one atomic load-mutate-save cycle.

use crate::domain::{
    MatchStats, Participant, ParticipantId, Question, QuestionId, Result, RoundReport, Team,
    TeamStats,
};

/// Primary API of the Team Formation Engine.
///
/// Implemented by [`FormationService`](crate::service::FormationService);
/// collaborators may depend on the trait to stay decoupled from the store
/// type.
pub trait FormationApi: Send + Sync {
    /// Registers `id` (first contact creates the participant record) and
    /// appends it to the waiting queue if absent. Idempotent: an already
    /// queued participant keeps its position.
    ///
    /// # Errors
    /// - `ParticipantTeamed`: the participant belongs to an active team
    /// - `Store`: the snapshot could not be loaded or saved
    fn enqueue(&self, id: ParticipantId) -> Result<()>;

    /// Removes `id` from the waiting queue. Returns whether it was present.
    fn remove(&self, id: ParticipantId) -> Result<bool>;

    /// 0-based queue position of `id`, or `None` if not queued.
    fn position_of(&self, id: ParticipantId) -> Result<Option<usize>>;

    /// Runs one matching round over the current queue snapshot: forms teams,
    /// flips members to teamed, drains them from the queue, and persists
    /// everything in a single save. Returns the created teams and the
    /// remaining queue size so the caller can notify affected participants.
    ///
    /// With fewer than `base` waiting, no teams form and the report is
    /// empty.
    ///
    /// # Errors
    /// - `TeamOperationFailed`: persistence failed; no changes were applied
    fn run_matching_round(&self) -> Result<RoundReport>;

    /// Archives an active team and releases its members back into the queue,
    /// at the back (default, arrival fairness) or the front (priority
    /// re-entry), preserving their relative sub-order. Returns the released
    /// members.
    ///
    /// # Errors
    /// - `TeamNotFound` / `TeamNotActive`
    /// - `TeamOperationFailed`: persistence failed; no changes were applied
    fn disband(&self, team_id: &str, insert_at_front: bool) -> Result<Vec<ParticipantId>>;

    /// Removes a single member from an active team. An emptied team is
    /// archived (the record remains for audit). The removed participant
    /// becomes waiting but is NOT re-enqueued; re-entry is an explicit
    /// [`enqueue`](Self::enqueue) call.
    ///
    /// # Errors
    /// - `TeamNotFound` / `TeamNotActive` / `MemberNotInTeam`
    /// - `TeamOperationFailed`: persistence failed; no changes were applied
    fn remove_member(&self, team_id: &str, id: ParticipantId) -> Result<()>;

    /// Looks up a team by label.
    fn get_team(&self, team_id: &str) -> Result<Option<Team>>;

    /// Looks up a participant record.
    fn get_participant(&self, id: ParticipantId) -> Result<Option<Participant>>;

    /// Current waiting-queue length.
    fn queue_size(&self) -> Result<usize>;

    /// First `limit` queued participant ids, for status displays.
    fn queue_preview(&self, limit: usize) -> Result<Vec<ParticipantId>>;

    /// Count and mean size of active teams.
    fn active_team_stats(&self) -> Result<TeamStats>;

    /// Predicts the next round's outcome from the current queue length,
    /// without executing it.
    fn match_preview(&self) -> Result<MatchStats>;

    /// Records a new question from a participant. Returns its label.
    fn create_question(&self, participant: ParticipantId, text: &str) -> Result<QuestionId>;

    /// Records an answer on an open question. Returns false if the question
    /// does not exist or is already answered.
    fn answer_question(
        &self,
        question_id: &str,
        answer: &str,
        answered_by: ParticipantId,
    ) -> Result<bool>;

    /// All questions still awaiting an answer.
    fn unanswered_questions(&self) -> Result<Vec<Question>>;

    /// Looks up a question by label.
    fn get_question(&self, question_id: &str) -> Result<Option<Question>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // The API must stay object-safe so hosts can hold `Arc<dyn FormationApi>`.
    fn _assert_object_safe(_: &dyn FormationApi) {}
}
