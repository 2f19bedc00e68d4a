//! TickLoop: frame-paced driver for a RecallController
//!
//! One tick per interval period on the calling task. The next tick is only
//! scheduled after the current one has returned, so ticks never overlap.

use crate::config::HarnessConfig;
use crate::engine::PhaseEngine;
use crate::recall::controller::RecallController;
use crate::recall::session::{Completion, Frame, Tick};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Why a loop returned
#[derive(Debug, Clone, PartialEq)]
pub enum LoopExit {
    Completed(Completion),
    /// `TickLoopHandle::stop` was called; the session is left as it was
    Stopped,
    /// Nothing was running
    Idle,
}

/// Cloneable stop switch for a running loop
#[derive(Debug, Clone)]
pub struct TickLoopHandle {
    stop_tx: Arc<watch::Sender<bool>>,
}

impl TickLoopHandle {
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }
}

pub struct TickLoop {
    period: Duration,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl TickLoop {
    pub fn new(period: Duration) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            period: period.max(MIN_PERIOD),
            stop_tx: Arc::new(stop_tx),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(Duration::from_millis(config.display.frame_interval_ms))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn handle(&self) -> TickLoopHandle {
        TickLoopHandle {
            stop_tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Tick `controller` once per period until its session finishes or the
    /// loop is stopped. Stop requests made before `start` are discarded.
    pub async fn start<E, F>(&self, controller: &mut RecallController<E>, mut on_frame: F) -> LoopExit
    where
        E: PhaseEngine,
        F: FnMut(&Frame),
    {
        self.stop_tx.send_replace(false);
        let mut stop_rx = self.stop_tx.subscribe();
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow_and_update() {
                        tracing::debug!(
                            "Tick loop stopped at step {} ({})",
                            controller.steps(),
                            controller.state()
                        );
                        return LoopExit::Stopped;
                    }
                    continue;
                }

                _ = ticker.tick() => {}
            }

            match controller.tick() {
                Tick::Idle => return LoopExit::Idle,
                Tick::Running(frame) => on_frame(&frame),
                Tick::Finished(completion) => {
                    on_frame(&controller.frame());
                    return LoopExit::Completed(completion);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ResonanceNetwork;
    use crate::recall::session::ControllerState;

    fn small_config() -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.layout.grid_rows = 6;
        config.layout.grid_cols = 6;
        config.layout.text_len = 0;
        config.layout.waveform_len = 0;
        config
    }

    fn controller(config: &HarnessConfig) -> RecallController<ResonanceNetwork> {
        let engine = ResonanceNetwork::with_seed(config.engine_size(), 10, 11);
        RecallController::new(engine, config)
    }

    #[test]
    fn test_period_floor() {
        let ticker = TickLoop::new(Duration::ZERO);
        assert_eq!(ticker.period(), MIN_PERIOD);
        assert_eq!(
            TickLoop::from_config(&HarnessConfig::default()).period(),
            Duration::from_millis(16)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_controller_returns_immediately() {
        let config = small_config();
        let mut ctrl = controller(&config);
        let ticker = TickLoop::from_config(&config);
        let exit = ticker.start(&mut ctrl, |_| {}).await;
        assert_eq!(exit, LoopExit::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_runs_to_completion_one_frame_per_tick() {
        let config = small_config();
        let mut ctrl = controller(&config);
        let pattern = vec![0.0; config.engine_size()];
        assert!(ctrl.begin_store("flat", &pattern).is_accepted());

        let mut frames = Vec::new();
        let exit = TickLoop::from_config(&config)
            .start(&mut ctrl, |frame| frames.push(*frame))
            .await;

        match exit {
            LoopExit::Completed(done) => assert_eq!(done.steps, 50),
            other => panic!("unexpected {:?}", other),
        }
        // 50 steps in batches of 5, the last frame reports the idle state
        assert_eq!(frames.len(), 10);
        assert!(frames.windows(2).all(|w| w[0].steps < w[1].steps));
        assert_eq!(frames.last().unwrap().state, ControllerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_keeps_session_and_new_loop_resumes() {
        let config = small_config();
        let mut ctrl = controller(&config);
        let pattern = vec![0.0; config.engine_size()];
        ctrl.begin_store("flat", &pattern);

        let ticker = TickLoop::from_config(&config);
        let handle = ticker.handle();
        let mut seen = 0;
        let exit = ticker
            .start(&mut ctrl, |_| {
                seen += 1;
                if seen == 2 {
                    handle.stop();
                }
            })
            .await;

        assert_eq!(exit, LoopExit::Stopped);
        assert!(handle.is_stopped());
        assert_eq!(ctrl.state(), ControllerState::Storing);
        assert_eq!(ctrl.steps(), 10);

        let resumed = TickLoop::from_config(&config).start(&mut ctrl, |_| {}).await;
        assert!(matches!(resumed, LoopExit::Completed(_)));
        assert_eq!(ctrl.library().len(), 1);
    }
}
