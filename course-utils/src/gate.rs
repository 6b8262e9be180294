use std::sync::Arc;

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::Serialize;
use store::{DocumentStore, Error, Result, model::VerificationRecord};
use tracing::{debug, info, instrument};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
    NotVerified,
    Verified,
}

/// Identity check that must pass before a learner enters a course's learn flow.
///
/// A verification only counts for the session it was captured in.
#[derive(Clone)]
pub struct VerificationGate {
    store: Arc<dyn DocumentStore>,
}

impl VerificationGate {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        VerificationGate { store }
    }

    pub async fn state(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        session_id: &str,
    ) -> Result<VerificationState> {
        let record = self.store.find_verification(user_id, course_id).await?;
        Ok(match record {
            Some(r) if r.session_id == session_id => VerificationState::Verified,
            _ => VerificationState::NotVerified,
        })
    }

    /// Rejects a capture before any photo is uploaded.
    pub async fn ensure_capture_allowed(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        session_id: &str,
    ) -> Result<()> {
        if session_id.is_empty() {
            return Err(Error::Auth("session has no id".to_string()));
        }
        match self.state(user_id, course_id, session_id).await? {
            VerificationState::NotVerified => Ok(()),
            VerificationState::Verified => Err(already_verified(course_id)),
        }
    }

    /// `NotVerified -> Verified`. A record left over from an older session is replaced.
    ///
    /// Only one capture per session is accepted, even when several race past
    /// `ensure_capture_allowed`.
    #[instrument(skip(self), err(Debug))]
    pub async fn accept_capture(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        session_id: &str,
        photo_key: String,
    ) -> Result<VerificationState> {
        if session_id.is_empty() {
            return Err(Error::Auth("session has no id".to_string()));
        }

        let accepted = self
            .store
            .insert_verification(VerificationRecord {
                id: ObjectId::new(),
                user_id,
                course_id,
                session_id: session_id.to_string(),
                photo_key,
                accepted_at: DateTime::now(),
            })
            .await?;
        if !accepted {
            return Err(already_verified(course_id));
        }
        info!(user = %user_id, course = %course_id, "verification accepted");

        Ok(VerificationState::Verified)
    }

    pub async fn can_enter_learn_flow(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
        session_id: &str,
    ) -> Result<bool> {
        let state = self.state(user_id, course_id, session_id).await?;
        debug!(user = %user_id, course = %course_id, ?state, "learn flow gate");
        Ok(state == VerificationState::Verified)
    }

    /// `Verified -> NotVerified`. Exiting an unverified course is a no-op.
    pub async fn exit_learn_flow(
        &self,
        user_id: ObjectId,
        course_id: ObjectId,
    ) -> Result<VerificationState> {
        if self.store.delete_verification(user_id, course_id).await? {
            info!(user = %user_id, course = %course_id, "left learn flow");
        }
        Ok(VerificationState::NotVerified)
    }
}

fn already_verified(course_id: ObjectId) -> Error {
    Error::Validation(format!(
        "course {course_id} is already verified for this session"
    ))
}
