//! Dense input timeline decoded from the compressed event payload.
//!
//! The payload decompresses to comma-separated `w|x|y|z` records: a
//! millisecond delta since the previous record, a cursor position, and the
//! raw button bitfield. Each record marks a state change at its cumulative
//! offset; the state then holds until the next record. The decoder expands
//! that into one [`Sample`] per millisecond so consumers can index by time
//! directly instead of replaying deltas.
//!
//! Expansion is append-only: a record advancing the clock from `t0` to `t1`
//! fills offsets `[t0, t1)` with the sample that was holding during that
//! span. Records with `w == 0` (key-tap markers) and records that never
//! advance the clock (the negative-delta RNG-seed trailer modern clients
//! append) fill nothing themselves; they only become the holding state for
//! the next advance.

use crate::error::{DecodeError, Result};
use crate::mods::Mods;
use crate::sample::{ButtonState, Sample, PLAYFIELD_HEIGHT};

/// One sample per millisecond from offset 0, immutable after decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    samples: Vec<Sample>,
}

impl Timeline {
    /// Decode the raw LZMA payload into a dense timeline.
    ///
    /// `mods` parameterizes the geometry: with [`Mods::HARD_ROCK`] set,
    /// every `y` is mirrored about the playfield midline (`384 - y`) as the
    /// record is read. The mirror is one-way; consumers comparing mirrored
    /// and unmirrored replays undo it themselves.
    pub fn decode(payload: &[u8], mods: Mods) -> Result<Self> {
        let mut text_bytes = Vec::new();
        lzma_rs::lzma_decompress(&mut std::io::Cursor::new(payload), &mut text_bytes)
            .map_err(|e| DecodeError::DecompressionFailure(e.to_string()))?;
        let text = String::from_utf8(text_bytes).map_err(|_| {
            DecodeError::DecompressionFailure("decompressed payload is not valid UTF-8".into())
        })?;

        let mirror = mods.contains(Mods::HARD_ROCK);
        let mut samples: Vec<Sample> = Vec::new();
        let mut holding: Option<Sample> = None;
        let mut t: i64 = 0;

        for rec in text.split(',') {
            if rec.is_empty() {
                continue;
            }
            let (w, x, y, z) = parse_record(rec)?;
            // A delta the clock cannot absorb is input damage, not a
            // longer replay.
            t = t.checked_add(w).ok_or_else(|| malformed(rec))?;
            if t > samples.len() as i64 {
                if let Some(held) = holding {
                    samples.resize(t as usize, held);
                }
            }
            let y = if mirror { PLAYFIELD_HEIGHT - y } else { y };
            holding = Some(Sample {
                x,
                y,
                buttons: ButtonState::from_raw(z),
            });
        }

        Ok(Self { samples })
    }

    /// The sample holding during millisecond `offset_ms`. Offsets past the
    /// end clamp to the last sample (the pose holds after input ends);
    /// `None` only for an empty timeline.
    pub fn sample_at(&self, offset_ms: u64) -> Option<Sample> {
        let last = self.samples.len().checked_sub(1)? as u64;
        Some(self.samples[offset_ms.min(last) as usize])
    }

    /// Total filled length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples, one per millisecond from offset 0.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

/// Split one `w|x|y|z` record into its four fields.
fn parse_record(rec: &str) -> Result<(i64, f32, f32, u32)> {
    let (w, rest) = rec.split_once('|').ok_or_else(|| malformed(rec))?;
    let (x, rest) = rest.split_once('|').ok_or_else(|| malformed(rec))?;
    let (y, z) = rest.split_once('|').ok_or_else(|| malformed(rec))?;
    if z.contains('|') {
        return Err(malformed(rec));
    }
    Ok((
        w.parse::<i64>().map_err(|_| malformed(rec))?,
        x.parse::<f32>().map_err(|_| malformed(rec))?,
        y.parse::<f32>().map_err(|_| malformed(rec))?,
        z.parse::<u32>().map_err(|_| malformed(rec))?,
    ))
}

fn malformed(rec: &str) -> DecodeError {
    DecodeError::MalformedEventRecord(rec.to_string())
}
