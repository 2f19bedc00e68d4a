//! Session: explicit state of one store or recall run
//!
//! Everything the controller reports outward (frames, completions, status)
//! is a plain serializable snapshot of this state.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerState {
    #[default]
    Idle,
    Storing,
    Recalling,
    Converged,
}

impl ControllerState {
    /// Storing and recalling hold the engine; every other request waits
    pub fn is_busy(&self) -> bool {
        matches!(self, ControllerState::Storing | ControllerState::Recalling)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Storing => "storing",
            ControllerState::Recalling => "recalling",
            ControllerState::Converged => "converged",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Store,
    Recall,
}

/// Pattern the running session steers toward
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub phases: Arc<[f64]>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: ControllerState,
    pub target: Option<Target>,
    pub steps: usize,
    pub similarity: Option<f64>,
}

impl Session {
    pub fn begin(&mut self, state: ControllerState, target: Target) {
        self.state = state;
        self.target = Some(target);
        self.steps = 0;
        self.similarity = None;
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.name.as_str())
    }
}

/// Outcome of a request that is not a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Request {
    Accepted,
    /// A store or recall is running
    Rejected,
    /// Name already in the library
    Duplicate,
    /// No library entry at that index
    NotFound,
    /// Pattern length differs from the engine size
    Invalid,
}

impl Request {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Request::Accepted)
    }
}

/// Result of a finished store or recall
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub kind: SessionKind,
    pub target: String,
    pub steps: usize,
    pub similarity: f64,
    /// Similarity passed the recall threshold (for stores: by the end of forcing)
    pub converged: bool,
}

/// Per-tick snapshot for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frame {
    pub state: ControllerState,
    pub steps: usize,
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Nothing running
    Idle,
    Running(Frame),
    Finished(Completion),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub state: ControllerState,
    pub steps: usize,
    pub similarity: Option<f64>,
    pub target: Option<String>,
    pub library_size: usize,
    pub energy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_states() {
        assert!(!ControllerState::Idle.is_busy());
        assert!(ControllerState::Storing.is_busy());
        assert!(ControllerState::Recalling.is_busy());
        assert!(!ControllerState::Converged.is_busy());
    }

    #[test]
    fn test_session_begin_resets_counters() {
        let mut session = Session {
            steps: 42,
            similarity: Some(0.9),
            ..Default::default()
        };
        session.begin(
            ControllerState::Recalling,
            Target {
                name: "Cross".to_string(),
                phases: Arc::from(vec![0.0; 4]),
            },
        );
        assert_eq!(session.steps, 0);
        assert_eq!(session.similarity, None);
        assert_eq!(session.target_name(), Some("Cross"));
    }

    #[test]
    fn test_status_serializes_lowercase_state() {
        let status = Status {
            state: ControllerState::Converged,
            steps: 12,
            similarity: Some(0.97),
            target: Some("Circle".to_string()),
            library_size: 2,
            energy: -0.5,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "converged");
        assert_eq!(json["library_size"], 2);
    }
}
