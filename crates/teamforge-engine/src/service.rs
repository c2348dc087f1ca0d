//! Formation service: queue operations and the team lifecycle registry.
//!
//! Every operation is one load -> mutate -> save cycle against the injected
//! [`DocumentStore`], executed under a process-local mutex. That single
//! transaction boundary is what keeps participant status and queue
//! membership consistent: they always change together or not at all. A
//! matching round applies all of its teams and the queue drain in one save,
//! so a store failure abandons the whole round and leaves the previous
//! snapshot intact.
//!
//! Cross-process writers are out of scope: the engine assumes one active
//! process (deployment discipline, assisted by the runtime's instance lock).

use crate::config::EngineConfig;
use crate::domain::{
    match_round, match_stats, EngineError, MatchStats, Participant, ParticipantId,
    ParticipantStatus, Question, QuestionId, Result, RoundReport, StateDocument, Team, TeamStats,
    TeamStatus, TeamSummary,
};
use crate::ports::inbound::FormationApi;
use crate::ports::outbound::{DocumentStore, TimeSource};
use std::sync::{Arc, Mutex, PoisonError};

/// The Team Formation Engine's service layer.
///
/// Owns the store exclusively; hosts construct one instance and share it
/// (`Arc`) between the scheduler and any manual trigger paths.
pub struct FormationService<S: DocumentStore> {
    store: Mutex<S>,
    time: Arc<dyn TimeSource>,
    config: EngineConfig,
}

impl<S: DocumentStore> FormationService<S> {
    /// Creates a service over `store` with validated matching parameters.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `config` is rejected; fatal at startup.
    pub fn new(store: S, config: EngineConfig, time: Arc<dyn TimeSource>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Mutex::new(store),
            time,
            config,
        })
    }

    /// The validated matching parameters.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs `f` with exclusive access to the store. This is the single
    /// writer lock for the whole load-mutate-save cycle.
    fn with_store<T>(&self, f: impl FnOnce(&mut S) -> Result<T>) -> Result<T> {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    fn load_for_read(&self) -> Result<StateDocument> {
        self.with_store(|store| Ok(store.load()?))
    }
}

impl<S: DocumentStore> FormationApi for FormationService<S> {
    fn enqueue(&self, id: ParticipantId) -> Result<()> {
        self.with_store(|store| {
            let mut doc = store.load()?;

            let participant = doc.participant_mut(id);
            if participant.status == ParticipantStatus::Teamed {
                let team = participant.team.clone().unwrap_or_default();
                return Err(EngineError::ParticipantTeamed {
                    participant: id,
                    team,
                });
            }

            if doc.enqueue(id) {
                store.save(&doc)?;
                tracing::debug!("[registry] participant {id} enqueued at position {}", doc.queue.len() - 1);
            }
            Ok(())
        })
    }

    fn remove(&self, id: ParticipantId) -> Result<bool> {
        self.with_store(|store| {
            let mut doc = store.load()?;
            let removed = doc.remove_from_queue(id);
            if removed {
                store.save(&doc)?;
            }
            Ok(removed)
        })
    }

    fn position_of(&self, id: ParticipantId) -> Result<Option<usize>> {
        Ok(self.load_for_read()?.position_of(id))
    }

    fn run_matching_round(&self) -> Result<RoundReport> {
        self.with_store(|store| {
            let mut doc = store.load()?;
            let outcome = match_round(&doc.queue, self.config.base, self.config.elastic);

            if outcome.teams.is_empty() {
                return Ok(RoundReport {
                    created: Vec::new(),
                    remaining: doc.queue.len(),
                });
            }

            let created_at = self.time.now_utc().to_rfc3339();
            let mut created = Vec::with_capacity(outcome.teams.len());
            for members in outcome.teams {
                let team_id = doc.next_team_id();
                for &member in &members {
                    let participant = doc.participant_mut(member);
                    participant.status = ParticipantStatus::Teamed;
                    participant.team = Some(team_id.clone());
                }
                doc.teams.insert(
                    team_id.clone(),
                    Team {
                        id: team_id.clone(),
                        members: members.clone(),
                        created_at: created_at.clone(),
                        status: TeamStatus::Active,
                    },
                );
                created.push(TeamSummary {
                    id: team_id,
                    members,
                });
            }
            doc.queue = outcome.leftover;
            let remaining = doc.queue.len();

            store
                .save(&doc)
                .map_err(|source| EngineError::TeamOperationFailed { source })?;

            tracing::info!(
                "[registry] round complete: {} teams formed, {} still waiting",
                created.len(),
                remaining
            );
            Ok(RoundReport { created, remaining })
        })
    }

    fn disband(&self, team_id: &str, insert_at_front: bool) -> Result<Vec<ParticipantId>> {
        self.with_store(|store| {
            let mut doc = store.load()?;

            let team = doc
                .teams
                .get_mut(team_id)
                .ok_or_else(|| EngineError::TeamNotFound(team_id.to_string()))?;
            if !team.is_active() {
                return Err(EngineError::TeamNotActive(team_id.to_string()));
            }

            team.status = TeamStatus::Archived;
            let members = team.members.clone();

            for &member in &members {
                let participant = doc.participant_mut(member);
                participant.status = ParticipantStatus::Waiting;
                participant.team = None;
            }

            if insert_at_front {
                doc.enqueue_front(&members);
            } else {
                for &member in &members {
                    doc.enqueue(member);
                }
            }

            store
                .save(&doc)
                .map_err(|source| EngineError::TeamOperationFailed { source })?;

            tracing::info!(
                "[registry] team {team_id} disbanded, {} members re-queued at the {}",
                members.len(),
                if insert_at_front { "front" } else { "back" }
            );
            Ok(members)
        })
    }

    fn remove_member(&self, team_id: &str, id: ParticipantId) -> Result<()> {
        self.with_store(|store| {
            let mut doc = store.load()?;

            let team = doc
                .teams
                .get_mut(team_id)
                .ok_or_else(|| EngineError::TeamNotFound(team_id.to_string()))?;
            if !team.is_active() {
                return Err(EngineError::TeamNotActive(team_id.to_string()));
            }
            let pos = team.members.iter().position(|&m| m == id).ok_or(
                EngineError::MemberNotInTeam {
                    team: team_id.to_string(),
                    participant: id,
                },
            )?;

            team.members.remove(pos);
            let emptied = team.members.is_empty();
            if emptied {
                team.status = TeamStatus::Archived;
            }

            let participant = doc.participant_mut(id);
            participant.status = ParticipantStatus::Waiting;
            participant.team = None;

            store
                .save(&doc)
                .map_err(|source| EngineError::TeamOperationFailed { source })?;

            if emptied {
                tracing::info!("[registry] team {team_id} emptied and archived");
            }
            Ok(())
        })
    }

    fn get_team(&self, team_id: &str) -> Result<Option<Team>> {
        Ok(self.load_for_read()?.teams.get(team_id).cloned())
    }

    fn get_participant(&self, id: ParticipantId) -> Result<Option<Participant>> {
        Ok(self.load_for_read()?.participants.get(&id).cloned())
    }

    fn queue_size(&self) -> Result<usize> {
        Ok(self.load_for_read()?.queue.len())
    }

    fn queue_preview(&self, limit: usize) -> Result<Vec<ParticipantId>> {
        let doc = self.load_for_read()?;
        Ok(doc.queue.iter().take(limit).copied().collect())
    }

    fn active_team_stats(&self) -> Result<TeamStats> {
        let doc = self.load_for_read()?;
        let sizes: Vec<usize> = doc.active_teams().map(|t| t.members.len()).collect();
        if sizes.is_empty() {
            return Ok(TeamStats::default());
        }
        let total: usize = sizes.iter().sum();
        Ok(TeamStats {
            active_teams: sizes.len(),
            avg_size: total as f64 / sizes.len() as f64,
        })
    }

    fn match_preview(&self) -> Result<MatchStats> {
        let doc = self.load_for_read()?;
        Ok(match_stats(
            doc.queue.len(),
            self.config.base,
            self.config.elastic,
        ))
    }

    fn create_question(&self, participant: ParticipantId, text: &str) -> Result<QuestionId> {
        self.with_store(|store| {
            let mut doc = store.load()?;
            let question_id = doc.next_question_id();
            doc.questions.insert(
                question_id.clone(),
                Question {
                    id: question_id.clone(),
                    participant,
                    text: text.to_string(),
                    created_at: self.time.now_utc().to_rfc3339(),
                    answered: false,
                    answer: None,
                    answered_by: None,
                    answered_at: None,
                },
            );
            store.save(&doc)?;
            Ok(question_id)
        })
    }

    fn answer_question(
        &self,
        question_id: &str,
        answer: &str,
        answered_by: ParticipantId,
    ) -> Result<bool> {
        self.with_store(|store| {
            let mut doc = store.load()?;
            let Some(question) = doc.questions.get_mut(question_id) else {
                return Ok(false);
            };
            if question.answered {
                return Ok(false);
            }
            question.answered = true;
            question.answer = Some(answer.to_string());
            question.answered_by = Some(answered_by);
            question.answered_at = Some(self.time.now_utc().to_rfc3339());
            store.save(&doc)?;
            Ok(true)
        })
    }

    fn unanswered_questions(&self) -> Result<Vec<Question>> {
        let doc = self.load_for_read()?;
        let mut open: Vec<Question> = doc
            .questions
            .values()
            .filter(|q| !q.answered)
            .cloned()
            .collect();
        open.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(open)
    }

    fn get_question(&self, question_id: &str) -> Result<Option<Question>> {
        Ok(self.load_for_read()?.questions.get(question_id).cloned())
    }
}
