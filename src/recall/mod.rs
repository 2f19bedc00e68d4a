//! Recall: the store/recall state machine and its frame-paced driver

pub mod controller;
pub mod session;
pub mod tick_loop;

pub use controller::RecallController;
pub use session::{
    Completion, ControllerState, Frame, Request, Session, SessionKind, Status, Target, Tick,
};
pub use tick_loop::{LoopExit, TickLoop, TickLoopHandle};
