//! Draw core: participant registry, session history, and the selection
//! engine, tied together by the [`Lottery`] controller.

mod engine;
mod history;
pub mod random;
mod registry;
mod state;

pub use engine::{DrawPhase, TickOutcome, WinnerSelectionEngine};
pub use history::DrawSessionLog;
pub use random::{Clock, RandomSource, SystemClock, ThreadRandom};
pub use registry::ParticipantRegistry;
pub use state::{ImportMode, ImportOutcome, Lottery, LotteryState};
