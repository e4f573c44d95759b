//! Drives a [`ReviewState`] against the backend
//!
//! Actions are applied to the in-memory state first; the resulting effects
//! are then carried out through the [`ApiClient`]. A failed save is reported
//! through the state's banner and answered with a reload, preceded by a
//! write-back of the original record when a split was half saved. A 401 ends
//! the session.

use crate::client::ApiClient;
use crate::error::{ClientError, ControllerError};
use mdash_attendance::{Effect, ReviewAction, ReviewState};
use std::collections::VecDeque;
use tracing::{info, warn};

pub struct ReviewController {
    client: ApiClient,
    state: ReviewState,
}

impl ReviewController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: ReviewState::default(),
        }
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Reload the submission list
    pub async fn refresh(&mut self) -> Result<(), ControllerError> {
        self.run_effects(vec![Effect::Refetch], true).await
    }

    /// Apply an action and carry out its effects
    ///
    /// # Errors
    ///
    /// - `Review` if the action was refused; nothing changed
    /// - `Persist` if the action was applied but saving it failed; the list
    ///   has been reloaded and the banner holds the message
    /// - `Client` with `SessionExpired` if the backend ended the session
    pub async fn dispatch(&mut self, action: ReviewAction) -> Result<(), ControllerError> {
        let effects = self.state.apply(action)?;
        self.run_effects(effects, false).await
    }

    async fn run_effects(
        &mut self,
        effects: Vec<Effect>,
        refetch_is_fatal: bool,
    ) -> Result<(), ControllerError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut failure: Option<ClientError> = None;
        let mut saved = 0usize;

        while let Some(effect) = queue.pop_front() {
            let result = match effect {
                Effect::Upsert(submission) => self
                    .client
                    .create_or_update_submission(&submission)
                    .await
                    .map(|_| saved += 1),
                Effect::Reject(id) => self
                    .client
                    .reject_submission(&id)
                    .await
                    .map(|_| saved += 1),
                Effect::Refetch => match self.client.get_submissions().await {
                    Ok(submissions) => {
                        info!(count = submissions.len(), "Loaded submissions");
                        queue.extend(self.state.apply(ReviewAction::Loaded(submissions))?);
                        Ok(())
                    }
                    Err(e) if refetch_is_fatal || e.is_session_expired() => Err(e),
                    Err(e) => {
                        warn!("Reload after failed save also failed: {}", e);
                        Ok(())
                    }
                },
                Effect::Logout => self.client.logout(),
            };

            let Err(e) = result else { continue };
            if e.is_session_expired() {
                queue.clear();
                queue.extend(self.state.apply(ReviewAction::SessionExpired)?);
                failure = Some(e);
            } else if failure.is_some() {
                // Write-back or logout after an earlier failure; keep draining
                warn!("Recovery step failed: {}", e);
            } else {
                queue.clear();
                if !refetch_is_fatal {
                    queue.extend(self.state.apply(ReviewAction::PersistFailed(e.to_string()))?);
                }
                failure = Some(e);
            }
        }

        match failure {
            Some(e) if e.is_session_expired() || refetch_is_fatal => {
                Err(ControllerError::Client(e))
            }
            Some(e) => Err(ControllerError::Persist(e)),
            None => {
                if saved > 0 {
                    info!(saved, "Review saved");
                    self.state.apply(ReviewAction::PersistSucceeded)?;
                }
                Ok(())
            }
        }
    }
}
