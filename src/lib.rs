pub mod assembler;
pub mod codec;
pub mod config;
pub mod constants;
pub mod display;
pub mod engine;
pub mod generator;
pub mod library;
pub mod recall;
pub mod similarity;
pub mod verify;

pub use assembler::{Region, StateLayout};
pub use codec::{Decoded, Modality, PhaseCodec};
pub use config::HarnessConfig;
pub use engine::{PhaseEngine, ResonanceNetwork};
pub use generator::{generate, PatternKind};
pub use library::{PatternLibrary, StoredPattern};
pub use recall::{Completion, ControllerState, RecallController, Request, Status, TickLoop};
pub use similarity::similarity;
