//! RecallController: cooperative store/recall state machine over a phase engine
//!
//! Nothing here blocks or spawns. Each `tick()` advances at most one batch of
//! simulation steps and hands back a snapshot; the caller decides when the
//! next tick happens (`TickLoop`, `run_to_completion`, or a UI frame).

use crate::config::{HarnessConfig, PresentKnobs, RecallKnobs, StoreKnobs};
use crate::engine::PhaseEngine;
use crate::library::PatternLibrary;
use crate::recall::session::*;
use crate::similarity::similarity;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RecallController<E: PhaseEngine> {
    engine: E,
    library: PatternLibrary,
    session: Session,
    store: StoreKnobs,
    recall: RecallKnobs,
    present: PresentKnobs,
    dt: f64,
}

impl<E: PhaseEngine> RecallController<E> {
    pub fn new(engine: E, config: &HarnessConfig) -> Self {
        Self::with_knobs(
            engine,
            config.store.clone(),
            config.recall.clone(),
            config.present.clone(),
            config.engine.dt,
        )
    }

    pub fn with_knobs(
        engine: E,
        store: StoreKnobs,
        recall: RecallKnobs,
        present: PresentKnobs,
        dt: f64,
    ) -> Self {
        Self {
            engine,
            library: PatternLibrary::new(),
            session: Session::default(),
            store,
            recall,
            present,
            dt,
        }
    }

    /// Drive the engine toward `pattern`, then imprint it and file it under `name`
    pub fn begin_store(&mut self, name: &str, pattern: &[f64]) -> Request {
        if self.session.state.is_busy() {
            warn!("Store of '{}' rejected: {} in progress", name, self.session.state);
            return Request::Rejected;
        }
        if self.library.contains(name) {
            info!("'{}' is already stored, skipping", name);
            return Request::Duplicate;
        }
        if pattern.len() != self.engine.size() {
            warn!(
                "Store of '{}' rejected: {} phases for {} nodes",
                name,
                pattern.len(),
                self.engine.size()
            );
            return Request::Invalid;
        }

        self.engine.drive_pattern(pattern, self.store.drive_strength);
        self.session.begin(
            ControllerState::Storing,
            Target {
                name: name.to_string(),
                phases: Arc::from(pattern),
            },
        );
        debug!("Storing '{}'", name);
        Request::Accepted
    }

    /// Steer the engine back to library entry `index` under sustained drive
    pub fn begin_recall(&mut self, index: usize) -> Request {
        if self.session.state.is_busy() {
            warn!("Recall of #{} rejected: {} in progress", index, self.session.state);
            return Request::Rejected;
        }
        let Some(stored) = self.library.get(index) else {
            warn!("No stored pattern at #{}", index);
            return Request::NotFound;
        };
        if stored.len() != self.engine.size() {
            warn!(
                "Recall of '{}' rejected: {} phases for {} nodes",
                stored.name(),
                stored.len(),
                self.engine.size()
            );
            return Request::Invalid;
        }

        let target = Target {
            name: stored.name().to_string(),
            phases: stored.share(),
        };
        self.engine
            .drive_pattern(&target.phases, self.recall.drive_strength);
        debug!("Recalling '{}'", target.name);
        self.session.begin(ControllerState::Recalling, target);
        Request::Accepted
    }

    pub fn recall_by_name(&mut self, name: &str) -> Request {
        match self.library.find(name) {
            Some(index) => self.begin_recall(index),
            None => {
                warn!("No stored pattern named '{}'", name);
                Request::NotFound
            }
        }
    }

    /// Advance the running session by one batch of steps
    pub fn tick(&mut self) -> Tick {
        match self.session.state {
            ControllerState::Storing => self.tick_store(),
            ControllerState::Recalling => self.tick_recall(),
            ControllerState::Idle | ControllerState::Converged => Tick::Idle,
        }
    }

    /// Tick until the running session finishes. `None` when nothing was running.
    pub fn run_to_completion(&mut self) -> Option<Completion> {
        loop {
            match self.tick() {
                Tick::Idle => return None,
                Tick::Running(_) => continue,
                Tick::Finished(completion) => return Some(completion),
            }
        }
    }

    fn tick_store(&mut self) -> Tick {
        let Some(target) = self.session.target.clone() else {
            self.session.state = ControllerState::Idle;
            return Tick::Idle;
        };

        let remaining = self.store.animation_steps.saturating_sub(self.session.steps);
        let batch = self.store.substeps.max(1).min(remaining);
        for _ in 0..batch {
            self.engine.step(self.dt, 0.0);
        }
        self.session.steps += batch;
        self.session.similarity = similarity(self.engine.phases(), &target.phases).ok();

        if self.session.steps < self.store.animation_steps {
            return Tick::Running(self.frame());
        }

        // imprint the exact target, not wherever forcing left the engine
        let score = self.session.similarity.unwrap_or(0.0);
        let converged = score > self.recall.threshold;
        self.engine.clear_drives();
        self.engine.load_phases(&target.phases);
        self.engine.imprint(self.store.imprint_strength);
        self.library.store(&target.name, &target.phases);
        self.session.state = ControllerState::Idle;
        info!(
            "Stored '{}' ({} patterns in library, forcing reached {:.3})",
            target.name,
            self.library.len(),
            score
        );

        Tick::Finished(Completion {
            kind: SessionKind::Store,
            target: target.name,
            steps: self.session.steps,
            similarity: score,
            converged,
        })
    }

    fn tick_recall(&mut self) -> Tick {
        let Some(target) = self.session.target.clone() else {
            self.session.state = ControllerState::Idle;
            return Tick::Idle;
        };

        let remaining = self.recall.max_steps.saturating_sub(self.session.steps);
        let batch = self.recall.substeps.max(1).min(remaining);
        for _ in 0..batch {
            self.engine
                .drive_pattern(&target.phases, self.recall.drive_strength);
            self.engine.step(self.dt, 0.0);
        }
        self.session.steps += batch;

        let score = similarity(self.engine.phases(), &target.phases).unwrap_or(0.0);
        self.session.similarity = Some(score);

        let converged = score > self.recall.threshold;
        if !converged && self.session.steps < self.recall.max_steps {
            return Tick::Running(self.frame());
        }

        self.engine.clear_drives();
        self.session.state = ControllerState::Converged;
        if converged {
            info!(
                "Recalled '{}' after {} steps (similarity {:.3})",
                target.name, self.session.steps, score
            );
        } else {
            warn!(
                "Recall of '{}' hit the {} step budget (similarity {:.3})",
                target.name, self.recall.max_steps, score
            );
        }

        Tick::Finished(Completion {
            kind: SessionKind::Recall,
            target: target.name,
            steps: self.session.steps,
            similarity: score,
            converged,
        })
    }

    /// Randomize the engine and forget the current target
    pub fn shake(&mut self) -> Request {
        if self.session.state.is_busy() {
            warn!("Shake rejected: {} in progress", self.session.state);
            return Request::Rejected;
        }
        self.engine.shake();
        self.session = Session::default();
        Request::Accepted
    }

    /// Empty the library and erase everything the engine learned
    pub fn clear_library(&mut self) -> Request {
        if self.session.state.is_busy() {
            warn!("Clear rejected: {} in progress", self.session.state);
            return Request::Rejected;
        }
        self.library.clear();
        self.engine.clear_patterns();
        self.session = Session::default();
        info!("Library cleared");
        Request::Accepted
    }

    /// Briefly drive `pattern` into the engine so it shows up, then let go.
    /// The pattern becomes the current target but is not stored.
    pub fn present(&mut self, name: &str, pattern: &[f64]) -> Request {
        if self.session.state.is_busy() {
            warn!("Preview of '{}' rejected: {} in progress", name, self.session.state);
            return Request::Rejected;
        }
        if pattern.len() != self.engine.size() {
            warn!(
                "Preview of '{}' rejected: {} phases for {} nodes",
                name,
                pattern.len(),
                self.engine.size()
            );
            return Request::Invalid;
        }

        self.engine.drive_pattern(pattern, self.present.drive_strength);
        for _ in 0..self.present.steps {
            self.engine.step(self.dt, 0.0);
        }
        self.engine.clear_drives();

        self.session = Session {
            state: ControllerState::Idle,
            target: Some(Target {
                name: name.to_string(),
                phases: Arc::from(pattern),
            }),
            steps: 0,
            similarity: similarity(self.engine.phases(), pattern).ok(),
        };
        Request::Accepted
    }

    pub fn frame(&self) -> Frame {
        Frame {
            state: self.session.state,
            steps: self.session.steps,
            similarity: self.session.similarity,
        }
    }

    pub fn status(&self) -> Status {
        Status {
            state: self.session.state,
            steps: self.session.steps,
            similarity: self.session.similarity,
            target: self.session.target_name().map(str::to_string),
            library_size: self.library.len(),
            energy: self.engine.energy(),
        }
    }

    /// Live similarity between the engine and the current target
    pub fn similarity(&self) -> Option<f64> {
        let target = self.session.target.as_ref()?;
        similarity(self.engine.phases(), &target.phases).ok()
    }

    pub fn state(&self) -> ControllerState {
        self.session.state
    }

    pub fn is_busy(&self) -> bool {
        self.session.state.is_busy()
    }

    pub fn steps(&self) -> usize {
        self.session.steps
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}
