use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{
    repository::SnapshotStore,
    types::{ManualRoundRequest, SessionView},
};
use crate::{
    export,
    game::{GameError, GameState, Round},
    scoring::{split_loss, Declaration, ScoringError},
    shared::AppError,
};

/// A session held in memory and the last time a request used it
#[derive(Debug)]
struct LiveSession {
    state: GameState,
    last_touched: Instant,
}

impl LiveSession {
    fn new(state: GameState) -> Self {
        Self {
            state,
            last_touched: Instant::now(),
        }
    }
}

/// Owns the live scoring sessions.
///
/// Every mutation runs under the write lock, so concurrent requests against
/// the engine are applied one at a time. A session missing from memory is
/// loaded from the snapshot store on first use, and every successful change
/// is written back. Store reads happen without holding the lock.
pub struct SessionService {
    sessions: RwLock<HashMap<String, LiveSession>>,
    store: Arc<dyn SnapshotStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Seats the players of a new session under a generated id
    #[instrument(skip(self))]
    pub async fn create_session(&self, names: &[String]) -> Result<SessionView, AppError> {
        let state = GameState::start(names)?;
        let session_id = Uuid::new_v4().to_string();

        self.persist(&session_id, &state).await;
        let view = SessionView::new(&session_id, &state);
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), LiveSession::new(state));

        info!(session_id = %session_id, players = names.len(), "Session created");
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn get_session(&self, session_id: &str) -> Result<SessionView, AppError> {
        self.ensure_loaded(session_id).await?;

        let mut sessions = self.sessions.write().await;
        let state = touch(&mut sessions, session_id)?;
        Ok(SessionView::new(session_id, state))
    }

    /// Seats new players in a session that was reset
    #[instrument(skip(self))]
    pub async fn start_session(
        &self,
        session_id: &str,
        names: &[String],
    ) -> Result<SessionView, AppError> {
        let view = self
            .mutate(session_id, |state| {
                if state.is_started() {
                    return Err(AppError::Conflict(
                        "the session is already running".to_string(),
                    ));
                }
                *state = GameState::start(names)?;
                Ok(())
            })
            .await
            .map(|(_, view)| view)?;

        info!(session_id = %session_id, players = names.len(), "Session started");
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn commit_declaration(
        &self,
        session_id: &str,
        declaration: &Declaration,
    ) -> Result<Round, AppError> {
        let (round, _) = self
            .mutate(session_id, |state| {
                Ok(state.commit_declaration(declaration)?.clone())
            })
            .await?;

        info!(
            session_id = %session_id,
            round_number = round.round_number,
            game_type_id = declaration.game_type_id,
            won = declaration.won,
            "Round committed"
        );
        Ok(round)
    }

    /// Commits a round whose points were entered by hand, either as full
    /// deltas or as one player's loss split over the others.
    #[instrument(skip(self, request))]
    pub async fn commit_manual(
        &self,
        session_id: &str,
        request: ManualRoundRequest,
    ) -> Result<Round, AppError> {
        let (round, _) = self
            .mutate(session_id, |state| {
                let deltas = match (&request.deltas, request.loss) {
                    (Some(deltas), None) => deltas.clone(),
                    (None, Some(loss)) => split_loss(
                        &state.player_ids(),
                        loss.loser_id,
                        loss.amount,
                        request.sitting_out_id,
                    )
                    .map_err(|e| match e {
                        ScoringError::InvalidDeclaration(reason) => {
                            GameError::InvalidRound(reason)
                        }
                        other => GameError::Scoring(other),
                    })?,
                    _ => {
                        return Err(AppError::BadRequest(
                            "give either deltas or a loss to split".to_string(),
                        ))
                    }
                };
                Ok(state.commit_round(deltas, request.metadata())?.clone())
            })
            .await?;

        info!(session_id = %session_id, round_number = round.round_number, "Manual round committed");
        Ok(round)
    }

    #[instrument(skip(self))]
    pub async fn undo_last(&self, session_id: &str) -> Result<Round, AppError> {
        let (round, _) = self
            .mutate(session_id, |state| Ok(state.undo_last()?))
            .await?;

        info!(session_id = %session_id, round_number = round.round_number, "Round undone");
        Ok(round)
    }

    /// Clears players and rounds; the session id stays usable for a new start
    #[instrument(skip(self))]
    pub async fn reset(&self, session_id: &str) -> Result<SessionView, AppError> {
        let (_, view) = self
            .mutate(session_id, |state| {
                state.reset();
                Ok(())
            })
            .await?;

        info!(session_id = %session_id, "Session reset");
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn export_csv(&self, session_id: &str) -> Result<String, AppError> {
        self.ensure_loaded(session_id).await?;

        let mut sessions = self.sessions.write().await;
        let state = touch(&mut sessions, session_id)?;
        Ok(export::to_csv(state)?)
    }

    /// Forgets a session in memory and in the store
    #[instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        let was_live = self.sessions.write().await.remove(session_id).is_some();
        let was_saved = matches!(self.store.load(session_id).await, Ok(Some(_)));
        if !was_live && !was_saved {
            return Err(not_found(session_id));
        }

        self.store.remove(session_id).await?;
        info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    /// Drops sessions nobody has touched for `max_idle` from memory and
    /// returns how many went. Their snapshots stay in the store, where the
    /// next request finds them, unless `discard_snapshots` is set.
    #[instrument(skip(self))]
    pub async fn evict_idle(&self, max_idle: Duration, discard_snapshots: bool) -> usize {
        let expired: Vec<String> = {
            let mut sessions = self.sessions.write().await;
            let expired: Vec<String> = sessions
                .iter()
                .filter(|(_, live)| live.last_touched.elapsed() >= max_idle)
                .map(|(id, _)| id.clone())
                .collect();
            for id in &expired {
                sessions.remove(id);
            }
            expired
        };

        for session_id in &expired {
            debug!(session_id = %session_id, "Evicted idle session");
            if discard_snapshots {
                if let Err(e) = self.store.remove(session_id).await {
                    warn!(session_id = %session_id, error = %e, "Failed to discard snapshot");
                }
            }
        }

        expired.len()
    }

    pub async fn live_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Applies `change` to a session under the write lock and persists the
    /// result when it succeeds.
    async fn mutate<T, F>(&self, session_id: &str, change: F) -> Result<(T, SessionView), AppError>
    where
        F: FnOnce(&mut GameState) -> Result<T, AppError>,
    {
        self.ensure_loaded(session_id).await?;

        let mut sessions = self.sessions.write().await;
        let state = touch(&mut sessions, session_id)?;

        let value = change(state)?;
        let view = SessionView::new(session_id, state);
        // Written under the lock so snapshots land in commit order.
        self.persist(session_id, state).await;

        Ok((value, view))
    }

    /// Brings a saved session into memory. The store is read without the
    /// map lock; if another request restored the session meanwhile, its copy
    /// wins.
    async fn ensure_loaded(&self, session_id: &str) -> Result<(), AppError> {
        if self.sessions.read().await.contains_key(session_id) {
            return Ok(());
        }

        let state = self
            .restore(session_id)
            .await
            .ok_or_else(|| not_found(session_id))?;
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_insert_with(|| LiveSession::new(state));
        Ok(())
    }

    /// A snapshot that cannot be read or does not hold together counts as
    /// no saved session.
    async fn restore(&self, session_id: &str) -> Option<GameState> {
        let snapshot = match self.store.load(session_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(session_id = %session_id, "No saved session");
                return None;
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to read saved session");
                return None;
            }
        };

        match GameState::restore(snapshot) {
            Ok(state) => {
                info!(session_id = %session_id, rounds = state.rounds().len(), "Session restored");
                Some(state)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Discarding malformed saved session");
                None
            }
        }
    }

    /// Write failures are logged; the in-memory session stays authoritative.
    async fn persist(&self, session_id: &str, state: &GameState) {
        if let Err(e) = self.store.save(session_id, &state.snapshot()).await {
            error!(session_id = %session_id, error = %e, "Failed to save session");
        }
    }
}

fn not_found(session_id: &str) -> AppError {
    AppError::NotFound(format!("Session not found: {session_id}"))
}

fn touch<'a>(
    sessions: &'a mut HashMap<String, LiveSession>,
    session_id: &str,
) -> Result<&'a mut GameState, AppError> {
    let live = sessions
        .get_mut(session_id)
        .ok_or_else(|| not_found(session_id))?;
    live.last_touched = Instant::now();
    Ok(&mut live.state)
}
