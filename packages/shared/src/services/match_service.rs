use std::collections::HashMap;
use std::sync::Arc;

use chess::Color;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::ArbiterConfig,
    models::{
        challenge::{Challenge, ChallengeResolution},
        client::{ClientKey, ClientRole},
        game_match::{Match, MatchResult},
        move_request::MoveRequest,
        notification::Notification,
    },
    repositories::role_repository::RoleRepository,
    services::{
        chess_service::ChessOracle, errors::match_service_errors::MatchServiceError, match_clock,
        notification_service::NotificationService,
    },
    time_source::TimeSource,
};

#[derive(Default)]
struct RegistryState {
    match_by_match_id: HashMap<Uuid, Match>,
    match_id_by_client_key: HashMap<ClientKey, Uuid>,
    challenges_by_challenger: HashMap<ClientKey, HashMap<ClientKey, Challenge>>,
    clocks: HashMap<Uuid, AbortHandle>,
}

impl RegistryState {
    fn can_start_match(&self, client_key: &str, role: ClientRole) -> bool {
        role == ClientRole::Bot || !self.match_id_by_client_key.contains_key(client_key)
    }

    fn check_participants(
        &self,
        new_match: &Match,
        roles: (ClientRole, ClientRole),
    ) -> Result<(), MatchServiceError> {
        let (white_role, black_role) = roles;

        if new_match.white_client_key == new_match.black_client_key {
            return Err(MatchServiceError::ParticipantUnavailable);
        }

        if !self.can_start_match(&new_match.white_client_key, white_role)
            || !self.can_start_match(&new_match.black_client_key, black_role)
        {
            return Err(MatchServiceError::ParticipantUnavailable);
        }

        Ok(())
    }

    fn challenge(&self, challenger_key: &str, challenged_key: &str) -> Option<&Challenge> {
        self.challenges_by_challenger
            .get(challenger_key)
            .and_then(|challenges| challenges.get(challenged_key))
    }

    fn remove_challenge(&mut self, challenger_key: &str, challenged_key: &str) -> Option<Challenge> {
        let challenges = self.challenges_by_challenger.get_mut(challenger_key)?;
        let removed = challenges.remove(challenged_key);
        if challenges.is_empty() {
            self.challenges_by_challenger.remove(challenger_key);
        }
        removed
    }

    /// Drops the match and its client mappings and cancels its clock.
    fn deregister(&mut self, match_id: &Uuid) -> Option<Match> {
        let removed = self.match_by_match_id.remove(match_id)?;

        for client_key in [&removed.white_client_key, &removed.black_client_key] {
            if self.match_id_by_client_key.get(client_key) == Some(match_id) {
                self.match_id_by_client_key.remove(client_key);
            }
        }

        if let Some(clock) = self.clocks.remove(match_id) {
            clock.abort();
        }

        Some(removed)
    }
}

struct MatchServiceInner {
    state: Mutex<RegistryState>,
    oracle: Arc<dyn ChessOracle + Send + Sync>,
    roles: Arc<dyn RoleRepository + Send + Sync>,
    notifications: NotificationService,
    time_source: Arc<dyn TimeSource + Send + Sync>,
    minimum_move_deduction_secs: f64,
}

/// Authoritative registry of active matches and open challenges.
///
/// All registry state sits behind one mutex. Notifications are published
/// while it is held, so for any one match they leave in the same order as
/// the state changes that caused them. Client roles are read with the lock
/// held, so availability is always judged against the role at decision time.
#[derive(Clone)]
pub struct MatchService {
    inner: Arc<MatchServiceInner>,
}

impl MatchService {
    pub fn new(
        oracle: Arc<dyn ChessOracle + Send + Sync>,
        roles: Arc<dyn RoleRepository + Send + Sync>,
        notifications: NotificationService,
        time_source: Arc<dyn TimeSource + Send + Sync>,
        config: &ArbiterConfig,
    ) -> Self {
        MatchService {
            inner: Arc::new(MatchServiceInner {
                state: Mutex::new(RegistryState::default()),
                oracle,
                roles,
                notifications,
                time_source,
                minimum_move_deduction_secs: config.minimum_move_deduction_secs,
            }),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.time_source.now()
    }

    async fn publish(&self, notification: Notification) {
        self.inner.notifications.publish(notification).await;
    }

    async fn participant_roles(&self, new_match: &Match) -> (ClientRole, ClientRole) {
        (
            self.inner.roles.role(&new_match.white_client_key).await,
            self.inner.roles.role(&new_match.black_client_key).await,
        )
    }

    /// Whether the client may enter a new match: bots always can, players only
    /// when they are not already in one.
    pub async fn can_start_match(&self, client_key: &str) -> bool {
        let state = self.inner.state.lock().await;
        let role = self.inner.roles.role(client_key).await;
        state.can_start_match(client_key, role)
    }

    pub async fn match_by_id(&self, match_id: &Uuid) -> Option<Match> {
        self.inner
            .state
            .lock()
            .await
            .match_by_match_id
            .get(match_id)
            .cloned()
    }

    pub async fn match_by_client_key(&self, client_key: &str) -> Option<Match> {
        let state = self.inner.state.lock().await;
        state
            .match_id_by_client_key
            .get(client_key)
            .and_then(|match_id| state.match_by_match_id.get(match_id))
            .cloned()
    }

    pub async fn active_match_count(&self) -> usize {
        self.inner.state.lock().await.match_by_match_id.len()
    }

    pub async fn challenges(&self, challenger_key: &str) -> Vec<Challenge> {
        self.inner
            .state
            .lock()
            .await
            .challenges_by_challenger
            .get(challenger_key)
            .map(|challenges| challenges.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn challenge(&self, challenger_key: &str, challenged_key: &str) -> Option<Challenge> {
        self.inner
            .state
            .lock()
            .await
            .challenge(challenger_key, challenged_key)
            .cloned()
    }

    pub async fn challenge_player(&self, challenge: Challenge) -> Result<(), MatchServiceError> {
        let mut state = self.inner.state.lock().await;
        let challenger_role = self.inner.roles.role(&challenge.challenger_key).await;

        let result = if challenge.challenger_key == challenge.challenged_key {
            Err(MatchServiceError::SelfChallenge)
        } else if !state.can_start_match(&challenge.challenger_key, challenger_role) {
            Err(MatchServiceError::Unavailable)
        } else if state
            .challenge(&challenge.challenger_key, &challenge.challenged_key)
            .is_some()
        {
            Err(MatchServiceError::DuplicateChallenge)
        } else {
            Ok(())
        };

        if let Err(e) = &result {
            warn!(
                "Challenge from {} to {} rejected: {}",
                challenge.challenger_key, challenge.challenged_key, e
            );
            self.publish(Notification::ChallengeRequestFailed {
                challenge,
                reason: e.to_string(),
            })
            .await;
            return result;
        }

        state
            .challenges_by_challenger
            .entry(challenge.challenger_key.clone())
            .or_default()
            .insert(challenge.challenged_key.clone(), challenge.clone());

        info!(
            "Challenge created: {} -> {} ({})",
            challenge.challenger_key, challenge.challenged_key, challenge.time_control
        );
        self.publish(Notification::ChallengeCreated { challenge }).await;

        Ok(())
    }

    /// Turns the open challenge into a match. If a participant is busy the
    /// challenge stays open.
    pub async fn accept_challenge(
        &self,
        challenged_key: &str,
        challenger_key: &str,
    ) -> Result<(), MatchServiceError> {
        let now = self.now();
        let mut state = self.inner.state.lock().await;

        let challenge = match state.challenge(challenger_key, challenged_key) {
            Some(challenge) => challenge.clone(),
            None => {
                warn!(
                    "No open challenge from {} to {} to accept",
                    challenger_key, challenged_key
                );
                return Err(MatchServiceError::ChallengeNotFound);
            }
        };

        let new_match = Match::from_challenge(&challenge, now);
        let roles = self.participant_roles(&new_match).await;

        if let Err(e) = state.check_participants(&new_match, roles) {
            warn!(
                "Cannot accept challenge from {} to {}: {}",
                challenger_key, challenged_key, e
            );
            self.publish(Notification::ChallengeRequestFailed {
                challenge,
                reason: e.to_string(),
            })
            .await;
            return Err(e);
        }

        self.resolve_challenge(
            &mut state,
            challenger_key,
            challenged_key,
            ChallengeResolution::Accepted,
        )
        .await?;

        self.register_match(&mut state, new_match, roles).await;
        Ok(())
    }

    pub async fn decline_challenge(
        &self,
        challenged_key: &str,
        challenger_key: &str,
    ) -> Result<(), MatchServiceError> {
        let mut state = self.inner.state.lock().await;
        self.resolve_challenge(
            &mut state,
            challenger_key,
            challenged_key,
            ChallengeResolution::Declined,
        )
        .await
        .map(|_| ())
    }

    pub async fn revoke_challenge(
        &self,
        challenger_key: &str,
        challenged_key: &str,
    ) -> Result<(), MatchServiceError> {
        let mut state = self.inner.state.lock().await;
        self.resolve_challenge(
            &mut state,
            challenger_key,
            challenged_key,
            ChallengeResolution::Revoked,
        )
        .await
        .map(|_| ())
    }

    /// Removes the open challenge and announces how it ended.
    async fn resolve_challenge(
        &self,
        state: &mut RegistryState,
        challenger_key: &str,
        challenged_key: &str,
        resolution: ChallengeResolution,
    ) -> Result<Challenge, MatchServiceError> {
        let challenge = state
            .remove_challenge(challenger_key, challenged_key)
            .ok_or(MatchServiceError::ChallengeNotFound)?;

        info!(
            "Challenge {:?}: {} -> {}",
            resolution, challenger_key, challenged_key
        );

        let notification = match resolution {
            ChallengeResolution::Accepted => Notification::ChallengeAccepted {
                challenge: challenge.clone(),
            },
            ChallengeResolution::Declined => Notification::ChallengeDenied {
                challenge: challenge.clone(),
            },
            ChallengeResolution::Revoked => Notification::ChallengeRevoked {
                challenge: challenge.clone(),
            },
        };
        self.publish(notification).await;

        Ok(challenge)
    }

    pub async fn add_match(&self, new_match: Match) -> Result<(), MatchServiceError> {
        let mut state = self.inner.state.lock().await;
        let roles = self.participant_roles(&new_match).await;

        if let Err(e) = state.check_participants(&new_match, roles) {
            warn!(
                "Cannot create match {} ({} vs {}): {}",
                new_match.match_id, new_match.white_client_key, new_match.black_client_key, e
            );
            self.publish(Notification::MatchCreationFailed {
                chess_match: new_match,
                reason: e.to_string(),
            })
            .await;
            return Err(e);
        }

        self.register_match(&mut state, new_match, roles).await;
        Ok(())
    }

    async fn register_match(
        &self,
        state: &mut RegistryState,
        new_match: Match,
        roles: (ClientRole, ClientRole),
    ) {
        let match_id = new_match.match_id;

        if roles.0 != ClientRole::Bot {
            state
                .match_id_by_client_key
                .insert(new_match.white_client_key.clone(), match_id);
        }
        if roles.1 != ClientRole::Bot {
            state
                .match_id_by_client_key
                .insert(new_match.black_client_key.clone(), match_id);
        }
        state.match_by_match_id.insert(match_id, new_match.clone());

        info!(
            "Match {} created: {} (white) vs {} (black), {}",
            match_id, new_match.white_client_key, new_match.black_client_key, new_match.time_control
        );

        self.start_clock(state, &new_match);
        self.publish(Notification::MatchCreated {
            chess_match: new_match,
        })
        .await;
    }

    pub async fn execute_move(
        &self,
        match_id: &Uuid,
        move_request: &MoveRequest,
    ) -> Result<(), MatchServiceError> {
        let now = self.now();
        let mut state = self.inner.state.lock().await;

        let current = match state.match_by_match_id.get(match_id) {
            Some(current) => current.clone(),
            None => {
                self.reject_move(match_id, move_request, MatchServiceError::MatchNotFound, vec![])
                    .await;
                return Err(MatchServiceError::MatchNotFound);
            }
        };

        if !self
            .inner
            .oracle
            .is_legal_move(&current.position, move_request)
        {
            self.reject_move(
                match_id,
                move_request,
                MatchServiceError::IllegalMove,
                current.participants(),
            )
            .await;
            return Err(MatchServiceError::IllegalMove);
        }

        let mover = current.side_to_move();
        let elapsed = ((now - current.last_move_time).num_milliseconds() as f64 / 1000.0)
            .max(self.inner.minimum_move_deduction_secs);
        let remaining = (current.time_remaining(mover) - elapsed).max(0.0);

        let mut next = current.clone();
        next.set_time_remaining(mover, remaining);
        next.last_move_time = now;
        if remaining <= 0.0 {
            // The flag fell before the move landed.
            next.result = MatchResult::timeout_win_for(!mover);
        }

        next.position = self.inner.oracle.apply_move(&current.position, move_request);
        next.move_history.push(move_request.to_string());

        if !next.is_terminal() {
            let bonus = current
                .time_control
                .bonus_after_move(current.position.fullmove_number());
            next.set_time_remaining(mover, remaining + bonus);
            next.result = MatchResult::from_outcome(next.position.outcome());
        }

        info!(
            "Match {}: {:?} played {} in {:.1}s, {:.1}s left",
            match_id, mover, move_request, elapsed, remaining
        );

        self.persist(&mut state, next).await.map(|_| ())
    }

    async fn reject_move(
        &self,
        match_id: &Uuid,
        move_request: &MoveRequest,
        error: MatchServiceError,
        participants: Vec<ClientKey>,
    ) {
        warn!("Move {} rejected for match {}: {}", move_request, match_id, error);
        self.publish(Notification::MoveFailure {
            match_id: *match_id,
            chess_move: move_request.to_string(),
            reason: error.to_string(),
            participants,
        })
        .await;
    }

    /// Overwrites a stored match. Participants and time control must not change.
    pub async fn set_match(&self, new_match: Match) -> Result<Match, MatchServiceError> {
        let mut state = self.inner.state.lock().await;
        self.persist(&mut state, new_match).await
    }

    /// Writes `new_match` over the stored copy and bumps its generation. A
    /// terminal match is deregistered; a live one gets a clock for whatever
    /// is left of the current turn.
    async fn persist(
        &self,
        state: &mut RegistryState,
        new_match: Match,
    ) -> Result<Match, MatchServiceError> {
        let stored = state
            .match_by_match_id
            .get_mut(&new_match.match_id)
            .ok_or(MatchServiceError::MatchNotFound)?;

        if !stored.has_same_identity(&new_match) {
            warn!(
                "Refusing to change participants or time control of match {}",
                new_match.match_id
            );
            return Err(MatchServiceError::ImmutableFieldChanged);
        }

        let mut new_match = new_match;
        new_match.generation = stored.generation + 1;
        *stored = new_match.clone();

        if new_match.is_terminal() {
            state.deregister(&new_match.match_id);
            info!(
                "Match {} ended: {:?}",
                new_match.match_id, new_match.result
            );
            self.publish(Notification::MatchEnded {
                chess_match: new_match.clone(),
            })
            .await;
        } else {
            self.start_clock(state, &new_match);
            self.publish(Notification::MatchUpdated {
                chess_match: new_match.clone(),
            })
            .await;
        }

        Ok(new_match)
    }

    pub async fn remove_match(&self, chess_match: &Match) -> Result<(), MatchServiceError> {
        let mut state = self.inner.state.lock().await;

        let removed = state
            .deregister(&chess_match.match_id)
            .ok_or(MatchServiceError::MatchNotFound)?;

        info!("Match {} removed", removed.match_id);
        self.publish(Notification::MatchEnded {
            chess_match: removed,
        })
        .await;

        Ok(())
    }

    pub async fn resign(&self, match_id: &Uuid, client_key: &str) -> Result<(), MatchServiceError> {
        let mut state = self.inner.state.lock().await;

        let current = state
            .match_by_match_id
            .get(match_id)
            .cloned()
            .ok_or(MatchServiceError::MatchNotFound)?;
        let colour = current
            .colour_of(client_key)
            .ok_or(MatchServiceError::NotParticipant)?;

        info!("Client {} resigned match {}", client_key, match_id);

        let mut next = current;
        next.result = MatchResult::resignation_win_for(!colour);
        self.persist(&mut state, next).await.map(|_| ())
    }

    /// Schedules the timeout for the side to move, replacing any earlier clock.
    /// Time already spent since `last_move_time` counts against the wait.
    fn start_clock(&self, state: &mut RegistryState, chess_match: &Match) {
        let spent_secs = ((self.now() - chess_match.last_move_time).num_milliseconds() as f64
            / 1000.0)
            .max(0.0);
        let wait_secs =
            (chess_match.time_remaining(chess_match.side_to_move()) - spent_secs).max(0.0);
        let clock = match_clock::spawn(
            self.clone(),
            chess_match.match_id,
            chess_match.generation,
            wait_secs,
        );

        if let Some(previous) = state.clocks.insert(chess_match.match_id, clock) {
            previous.abort();
        }
    }

    /// Called by a match clock when its wait is over. Only the clock whose
    /// generation still matches the stored match may end it.
    pub(crate) async fn expire_clock(&self, match_id: Uuid, generation: u64) {
        let mut state = self.inner.state.lock().await;

        let current = match state.match_by_match_id.get(&match_id) {
            Some(current) => current.clone(),
            None => {
                debug!("Clock for match {} woke after the match ended", match_id);
                return;
            }
        };

        if current.generation != generation {
            debug!(
                "Stale clock for match {} (generation {}, now {})",
                match_id, generation, current.generation
            );
            return;
        }

        // This task is the registered clock; drop the handle without aborting ourselves.
        state.clocks.remove(&match_id);

        let loser: Color = current.side_to_move();
        let mut next = current;
        next.set_time_remaining(loser, 0.0);
        next.result = MatchResult::timeout_win_for(!loser);

        info!(
            "Match {}: {} ran out of time",
            match_id,
            next.client_key(loser)
        );

        if let Err(e) = self.persist(&mut state, next).await {
            error!("Failed to record timeout for match {}: {}", match_id, e);
        }
    }
}
