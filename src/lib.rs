pub mod error;
pub mod mods;
pub mod sample;
pub mod header;
pub mod timeline;
pub mod replay;
pub mod batch;

pub use error::{DecodeError, Result};
pub use header::{GameMode, LifePoint, ReplayHeader};
pub use mods::Mods;
pub use replay::Replay;
pub use sample::{ButtonState, Sample, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
pub use timeline::Timeline;
