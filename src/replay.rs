//! The fully decoded replay — header plus timeline — and the ranking
//! order listing tools sort by.
//!
//! ```no_run
//! let bytes = std::fs::read("replay.osr")?;
//! let replay = osr::Replay::from_bytes(&bytes)?;
//! println!("{} scored {}", replay.header().player_name, replay.header().score);
//! if let Some(s) = replay.sample_at(replay.duration_ms() / 2) {
//!     println!("cursor at ({}, {})", s.x, s.y);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::cmp::{Ordering, Reverse};
use std::io::{Cursor, Read};

use crate::error::{DecodeError, Result};
use crate::header::ReplayHeader;
use crate::sample::Sample;
use crate::timeline::Timeline;

/// One decoded replay file. Constructed in one shot; immutable afterwards.
#[derive(Debug, Clone)]
pub struct Replay {
    header: ReplayHeader,
    timeline: Timeline,
}

impl Replay {
    /// Decode a complete replay file from a byte buffer.
    ///
    /// The header's `payload_length` delimits the compressed block; bytes
    /// after it are ignored. A buffer holding fewer payload bytes than
    /// declared fails with [`DecodeError::DecompressionFailure`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = ReplayHeader::read(&mut cursor)?;
        let start = cursor.position() as usize;
        let declared = header.payload_length as usize;
        let available = bytes.len() - start;
        if available < declared {
            return Err(DecodeError::DecompressionFailure(format!(
                "payload holds {} of {} declared bytes",
                available, declared
            )));
        }
        let timeline = Timeline::decode(&bytes[start..start + declared], header.mods)?;
        Ok(Self { header, timeline })
    }

    /// Read a byte source to its end and decode it.
    /// The decoder does no file I/O of its own; callers own the handle.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn header(&self) -> &ReplayHeader {
        &self.header
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Convenience for [`Timeline::sample_at`].
    pub fn sample_at(&self, offset_ms: u64) -> Option<Sample> {
        self.timeline.sample_at(offset_ms)
    }

    /// Convenience for [`Timeline::duration_ms`].
    pub fn duration_ms(&self) -> u64 {
        self.timeline.duration_ms()
    }

    // Listing order: lowest score first; among equal scores the more recent
    // run takes the higher place; player name breaks the remaining ties.
    fn ranking_key(&self) -> (u32, Reverse<u64>, &str) {
        (
            self.header.score,
            Reverse(self.header.recorded_at),
            self.header.player_name.as_str(),
        )
    }
}

// Ordering and equality look at the ranking key only, not the timeline.
impl PartialEq for Replay {
    fn eq(&self, other: &Self) -> bool {
        self.ranking_key() == other.ranking_key()
    }
}

impl Eq for Replay {}

impl PartialOrd for Replay {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Replay {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ranking_key().cmp(&other.ranking_key())
    }
}
