use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use predai_core::connector::{HistorySource, StatePublisher};
use predai_core::{History, PredaiError, RawSample, StateUpdate, days_before};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(PredaiError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

/// One `history` call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCall {
    /// Requested entity.
    pub entity_id: String,
    /// Requested end of the window.
    pub now: DateTime<Utc>,
    /// Requested window length.
    pub days: u32,
}

#[derive(Default)]
struct InternalState {
    history_rules: HashMap<String, MockBehavior<Vec<RawSample>>>,
    history_calls: Vec<HistoryCall>,
    states: HashMap<String, String>,
    state_failure: Option<PredaiError>,
    publish_failure: Option<PredaiError>,
    published: Vec<(String, StateUpdate)>,
}

/// Controller handle used by tests to drive the mock from the outside.
pub struct MockHassController {
    state: Arc<Mutex<InternalState>>,
}

impl MockHassController {
    /// Set the behavior for `history` calls for a specific entity.
    pub async fn set_history_behavior(
        &self,
        entity_id: impl Into<String>,
        behavior: MockBehavior<Vec<RawSample>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.history_rules.insert(entity_id.into(), behavior);
    }

    /// Shorthand for `MockBehavior::Return(samples)`.
    pub async fn set_history(&self, entity_id: impl Into<String>, samples: Vec<RawSample>) {
        self.set_history_behavior(entity_id, MockBehavior::Return(samples))
            .await;
    }

    /// Seed the current state of an entity.
    pub async fn set_state(&self, entity_id: impl Into<String>, state: impl Into<String>) {
        let mut guard = self.state.lock().await;
        guard.states.insert(entity_id.into(), state.into());
    }

    /// Delete an entity, as a user removing it from the UI would.
    pub async fn remove_state(&self, entity_id: &str) {
        let mut guard = self.state.lock().await;
        guard.states.remove(entity_id);
    }

    /// Make every `state` call fail with `err` (`None` restores normal behavior).
    pub async fn fail_state_reads(&self, err: Option<PredaiError>) {
        self.state.lock().await.state_failure = err;
    }

    /// Make every `set_state` call fail with `err` (`None` restores normal behavior).
    pub async fn fail_publishes(&self, err: Option<PredaiError>) {
        self.state.lock().await.publish_failure = err;
    }

    /// Every published `(entity_id, update)` in call order.
    pub async fn published(&self) -> Vec<(String, StateUpdate)> {
        self.state.lock().await.published.clone()
    }

    /// The last update published for `entity_id`.
    pub async fn last_published(&self, entity_id: &str) -> Option<StateUpdate> {
        let guard = self.state.lock().await;
        guard
            .published
            .iter()
            .rev()
            .find(|(e, _)| e == entity_id)
            .map(|(_, u)| u.clone())
    }

    /// Every `history` call in call order.
    pub async fn history_calls(&self) -> Vec<HistoryCall> {
        self.state.lock().await.history_calls.clone()
    }

    /// Clear all configured behaviors, states and call logs.
    pub async fn clear_all(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// An in-memory Home Assistant that defers all behavior to its controller.
///
/// Entities without a history rule return an empty history.
pub struct MockHass {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl MockHass {
    /// Create a new mock and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, MockHassController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = MockHassController {
            state: Arc::clone(&state),
        };
        (Arc::new(Self { name, state }), controller)
    }
}

fn state_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl HistorySource for MockHass {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn history(
        &self,
        entity_id: &str,
        now: DateTime<Utc>,
        days: u32,
    ) -> Result<History, PredaiError> {
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.history_calls.push(HistoryCall {
                entity_id: entity_id.to_string(),
                now,
                days,
            });
            guard.history_rules.get(entity_id).cloned()
        };
        let start = days_before(now, days)?;

        match behavior {
            Some(MockBehavior::Return(samples)) => Ok(History::from_samples(samples, start, now)),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(History::empty(start, now)),
        }
    }
}

#[async_trait]
impl StatePublisher for MockHass {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn state(&self, entity_id: &str) -> Result<Option<String>, PredaiError> {
        let guard = self.state.lock().await;
        if let Some(e) = &guard.state_failure {
            return Err(e.clone());
        }
        Ok(guard.states.get(entity_id).cloned())
    }

    async fn set_state(&self, entity_id: &str, update: StateUpdate) -> Result<(), PredaiError> {
        let mut guard = self.state.lock().await;
        if let Some(e) = &guard.publish_failure {
            return Err(e.clone());
        }
        guard
            .states
            .insert(entity_id.to_string(), state_string(&update.state));
        guard.published.push((entity_id.to_string(), update));
        Ok(())
    }
}
