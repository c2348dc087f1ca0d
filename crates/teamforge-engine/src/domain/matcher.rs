//! Elastic batch matching over a queue snapshot.
//!
//! [`match_round`] is a pure function from an ordered queue to teams plus a
//! leftover pool. It has no knowledge of storage and no side effects, which
//! keeps it directly testable against literal input/output pairs.
//!
//! A team starts at `base` members and may absorb up to `elastic` more.
//! Leftover distribution fills teams in creation order up to the cap before
//! moving on to the next team.

use super::entities::ParticipantId;
use std::collections::VecDeque;

/// Result of one matching computation: the formed teams and the participants
/// that remain waiting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Formed teams in creation order; members retain their queue order and
    /// the first member of each team is the lead.
    pub teams: Vec<Vec<ParticipantId>>,
    /// Participants not assigned to any team, in queue order.
    pub leftover: Vec<ParticipantId>,
}

/// Partitions `queue` into teams of `base` members, then distributes the
/// remainder into the formed teams up to `base + elastic` each.
///
/// With fewer than `base` queued, no teams form and the whole queue is
/// returned as leftover. `base` must be at least 1; the caller validates the
/// configuration once at startup.
pub fn match_round(queue: &[ParticipantId], base: usize, elastic: usize) -> MatchOutcome {
    if queue.is_empty() {
        return MatchOutcome::default();
    }

    let mut teams: Vec<Vec<ParticipantId>> = queue
        .chunks_exact(base)
        .map(|chunk| chunk.to_vec())
        .collect();
    let mut leftover: VecDeque<ParticipantId> =
        queue[teams.len() * base..].iter().copied().collect();

    // Fill each team to the cap before advancing to the next one.
    let cap = base + elastic;
    let mut slot = 0;
    while slot < teams.len() {
        if teams[slot].len() >= cap {
            slot += 1;
            continue;
        }
        match leftover.pop_front() {
            Some(id) => teams[slot].push(id),
            None => break,
        }
    }

    MatchOutcome {
        teams,
        leftover: leftover.into(),
    }
}

/// Preview of a potential round, computed from the queue length alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    /// Teams that would form.
    pub teams: usize,
    /// Participants that would be placed.
    pub matched: usize,
    /// Participants that would remain waiting.
    pub remaining: usize,
}

/// Simulates [`match_round`] for a queue of `queue_len` participants without
/// touching any real ids. Used by status displays.
pub fn match_stats(queue_len: usize, base: usize, elastic: usize) -> MatchStats {
    if queue_len < base {
        return MatchStats {
            teams: 0,
            matched: 0,
            remaining: queue_len,
        };
    }

    let ids: Vec<ParticipantId> = (0..queue_len as u64).collect();
    let outcome = match_round(&ids, base, elastic);
    MatchStats {
        teams: outcome.teams.len(),
        matched: queue_len - outcome.leftover.len(),
        remaining: outcome.leftover.len(),
    }
}

/// Checks that every team respects `base ..= base + elastic`.
pub fn teams_within_bounds(teams: &[Vec<ParticipantId>], base: usize, elastic: usize) -> bool {
    teams
        .iter()
        .all(|team| team.len() >= base && team.len() <= base + elastic)
}
