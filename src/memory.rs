use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::types::Action;

/// One observation of the page and, once decided, what was done about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Caller-supplied counter, stored verbatim.
    pub step_count: i64,
    pub page_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub task: String,
    pub steps: Vec<Step>,
}

/// In-memory history of automation sessions, keyed by the caller's session id.
///
/// Cloning shares the same map. Every operation takes the lock once, so each
/// is atomic on its own; nothing spans the model call.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an observation, creating the session with `task` on first sight.
    /// Returns the index of the new step.
    pub fn record(&self, session_id: &str, task: &str, step_count: i64, page_data: Value) -> usize {
        let mut sessions = self.lock();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, task, "new automation session");
                Session {
                    task: task.to_string(),
                    steps: Vec::new(),
                }
            });
        session.steps.push(Step {
            step_count,
            page_data,
            decision: None,
        });
        session.steps.len() - 1
    }

    pub fn attach_decision(
        &self,
        session_id: &str,
        step_index: usize,
        action: Action,
    ) -> Result<(), StoreError> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))?;
        let step = session
            .steps
            .get_mut(step_index)
            .ok_or_else(|| StoreError::StepNotFound {
                session_id: session_id.to_string(),
                index: step_index,
            })?;
        step.decision = Some(action);
        Ok(())
    }

    pub fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        self.lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    pub fn delete(&self, session_id: &str) -> Result<Session, StoreError> {
        self.lock()
            .remove(session_id)
            .ok_or_else(|| StoreError::NotFound(session_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
