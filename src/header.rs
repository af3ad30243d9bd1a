//! Replay header: the fixed little-endian region in front of the input
//! payload, plus the two variable-length primitives it is built from.
//!
//! # Layout
//!
//! All integers are little-endian, in this order:
//!
//! | Field           | Encoding                              |
//! |-----------------|---------------------------------------|
//! | game mode       | u8                                    |
//! | client version  | u32                                   |
//! | beatmap hash    | string                                |
//! | player name     | string                                |
//! | replay hash     | string                                |
//! | hit counts      | u16 × 6 (300, 100, 50, geki, katu, miss) |
//! | total score     | u32                                   |
//! | max combo       | u16                                   |
//! | perfect flag    | u8, nonzero = true                    |
//! | mods            | u32 bitfield                          |
//! | life graph      | string of `offset|fraction` records   |
//! | recorded at     | u64 tick value                        |
//! | payload length  | u32, bytes of LZMA payload that follow |
//!
//! # Strings
//!
//! A header *string* is one marker byte: `0x00` means empty and nothing
//! follows; `0x0B` is followed by a ULEB128 byte length and that many UTF-8
//! bytes. Any other marker byte fails the decode — the stream offset is
//! unrecoverable past a bad marker.

use std::fmt;
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;

use crate::error::{DecodeError, Result};
use crate::mods::Mods;

// ── Primitives ───────────────────────────────────────────────────────────────

/// Read a ULEB128-encoded unsigned integer.
///
/// An encoding carrying value bits past the 64-bit accumulator is rejected,
/// whether by an eleventh chain byte or by high bits in the tenth; a chain
/// cut off by end of input reports `TruncatedInput`.
pub fn read_uleb128<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = reader.read_u8()?;
        // At shift 63 only the lowest payload bit still fits.
        if shift >= 64 || (shift == 63 && byte & 0x7E != 0) {
            return Err(DecodeError::MalformedHeader(
                "ULEB128 value does not fit in 64 bits".into(),
            ));
        }
        result |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Read a marker-prefixed header string.
///
/// The declared length is honored through `Read::take`, so a corrupt length
/// cannot trigger a huge allocation up front; missing bytes surface as
/// `TruncatedInput`.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    match reader.read_u8()? {
        0x00 => Ok(String::new()),
        0x0B => {
            let len = read_uleb128(reader)?;
            let mut buf = Vec::new();
            let n = reader.by_ref().take(len).read_to_end(&mut buf)?;
            if (n as u64) < len {
                return Err(DecodeError::TruncatedInput);
            }
            String::from_utf8(buf)
                .map_err(|_| DecodeError::MalformedHeader("string is not valid UTF-8".into()))
        }
        other => Err(DecodeError::MalformedHeader(format!(
            "bad string marker 0x{:02x}",
            other
        ))),
    }
}

// ── Game mode ────────────────────────────────────────────────────────────────

/// Game mode discriminant from the first header byte.
/// Only [`GameMode::Osu`] replays carry a timeline this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameMode {
    Osu,
    Taiko,
    Catch,
    Mania,
}

impl GameMode {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(GameMode::Osu),
            1 => Some(GameMode::Taiko),
            2 => Some(GameMode::Catch),
            3 => Some(GameMode::Mania),
            _ => None,
        }
    }

    /// Human-readable mode name (for diagnostics only — never parsed).
    pub fn name(self) -> &'static str {
        match self {
            GameMode::Osu => "osu!",
            GameMode::Taiko => "Taiko",
            GameMode::Catch => "Catch the Beat",
            GameMode::Mania => "osu!mania",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Life graph ───────────────────────────────────────────────────────────────

/// One life-bar measurement from the header's life-graph string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifePoint {
    /// Offset from the start of the song, in milliseconds.
    pub offset_ms: i32,
    /// Remaining life at that instant, nominally 0.0 to 1.0. The range is
    /// descriptive; values outside it are kept as recorded.
    pub life: f32,
}

fn parse_life_graph(text: &str) -> Result<Vec<LifePoint>> {
    let mut points = Vec::new();
    for rec in text.split(',') {
        if rec.is_empty() {
            continue;
        }
        let (u, v) = rec
            .split_once('|')
            .ok_or_else(|| DecodeError::MalformedLifeGraph(rec.to_string()))?;
        let offset_ms = u
            .parse::<i32>()
            .map_err(|_| DecodeError::MalformedLifeGraph(rec.to_string()))?;
        let life = v
            .parse::<f32>()
            .map_err(|_| DecodeError::MalformedLifeGraph(rec.to_string()))?;
        points.push(LifePoint { offset_ms, life });
    }
    Ok(points)
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Decoded header fields. Immutable once read; field meanings follow the
/// layout table in the module docs.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayHeader {
    pub mode: GameMode,
    pub version: u32,
    pub beatmap_hash: String,
    pub player_name: String,
    pub replay_hash: String,
    pub count_300: u16,
    pub count_100: u16,
    pub count_50: u16,
    pub count_geki: u16,
    pub count_katu: u16,
    pub count_miss: u16,
    pub score: u32,
    pub max_combo: u16,
    pub perfect: bool,
    pub mods: Mods,
    pub life_graph: Vec<LifePoint>,
    pub recorded_at: u64,
    pub payload_length: u32,
}

impl ReplayHeader {
    /// Read the header region, consuming exactly the header bytes and
    /// leaving the reader positioned at the first payload byte.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mode_byte = reader.read_u8()?;
        let version = reader.read_u32::<LittleEndian>()?;
        let mode = GameMode::from_byte(mode_byte).ok_or_else(|| {
            DecodeError::MalformedHeader(format!("unknown game mode byte 0x{:02x}", mode_byte))
        })?;
        if mode != GameMode::Osu {
            return Err(DecodeError::UnsupportedMode(mode));
        }

        let beatmap_hash = read_string(&mut reader)?;
        let player_name = read_string(&mut reader)?;
        let replay_hash = read_string(&mut reader)?;

        let count_300 = reader.read_u16::<LittleEndian>()?;
        let count_100 = reader.read_u16::<LittleEndian>()?;
        let count_50 = reader.read_u16::<LittleEndian>()?;
        let count_geki = reader.read_u16::<LittleEndian>()?;
        let count_katu = reader.read_u16::<LittleEndian>()?;
        let count_miss = reader.read_u16::<LittleEndian>()?;
        let score = reader.read_u32::<LittleEndian>()?;
        let max_combo = reader.read_u16::<LittleEndian>()?;
        let perfect = reader.read_u8()? != 0;
        let mods = Mods::from_bits_retain(reader.read_u32::<LittleEndian>()?);

        let life_graph = parse_life_graph(&read_string(&mut reader)?)?;

        let recorded_at = reader.read_u64::<LittleEndian>()?;
        let payload_length = reader.read_u32::<LittleEndian>()?;

        Ok(Self {
            mode,
            version,
            beatmap_hash,
            player_name,
            replay_hash,
            count_300,
            count_100,
            count_50,
            count_geki,
            count_katu,
            count_miss,
            score,
            max_combo,
            perfect,
            mods,
            life_graph,
            recorded_at,
            payload_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn encode_uleb128(mut v: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let mut byte = (v & 0x7F) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if v == 0 {
                return out;
            }
        }
    }

    fn push_string(out: &mut Vec<u8>, s: &str) {
        if s.is_empty() {
            out.push(0x00);
        } else {
            out.push(0x0B);
            out.extend_from_slice(&encode_uleb128(s.len() as u64));
            out.extend_from_slice(s.as_bytes());
        }
    }

    fn sample_header_bytes() -> Vec<u8> {
        let mut b = Vec::new();
        b.push(0u8);
        b.extend_from_slice(&20131216u32.to_le_bytes());
        push_string(&mut b, "aee0e9f60ab66ae9fb6d9a0bd1a66ae9");
        push_string(&mut b, "cookiezi");
        push_string(&mut b, "bdca0bd1a66ae9fb6d9aee0e9f60ab66");
        for count in [1978u16, 5, 0, 247, 2, 1] {
            b.extend_from_slice(&count.to_le_bytes());
        }
        b.extend_from_slice(&132_408_001u32.to_le_bytes());
        b.extend_from_slice(&2385u16.to_le_bytes());
        b.push(0);
        b.extend_from_slice(&24u32.to_le_bytes()); // Hidden | HardRock
        push_string(&mut b, "0|1,1500|0.72,3000|1");
        b.extend_from_slice(&635_873_755_112_971_894u64.to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        b
    }

    #[test]
    fn uleb128_known_values() {
        assert_eq!(read_uleb128(&mut Cursor::new([0x00])).unwrap(), 0);
        assert_eq!(read_uleb128(&mut Cursor::new([0x7F])).unwrap(), 127);
        assert_eq!(read_uleb128(&mut Cursor::new([0x80, 0x01])).unwrap(), 128);
        assert_eq!(
            read_uleb128(&mut Cursor::new([0xE5, 0x8E, 0x26])).unwrap(),
            624_485
        );
    }

    #[test]
    fn uleb128_truncated_chain() {
        let err = read_uleb128(&mut Cursor::new([0x80])).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput));
        let err = read_uleb128(&mut Cursor::new([0xFF, 0x80])).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput));
    }

    #[test]
    fn uleb128_rejects_oversized_chain() {
        // Ten continuation bytes exhaust the accumulator; an eleventh byte
        // has nowhere to go.
        let mut bytes = vec![0x80u8; 10];
        bytes.push(0x01);
        let err = read_uleb128(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn uleb128_rejects_overflow_in_the_final_byte() {
        // Nine continuation bytes leave one bit of room; 0x7F needs seven.
        let mut bytes = vec![0x80u8; 9];
        bytes.push(0x7F);
        let err = read_uleb128(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));

        // The one remaining bit is still reachable.
        let mut bytes = vec![0x80u8; 9];
        bytes.push(0x01);
        assert_eq!(read_uleb128(&mut Cursor::new(bytes)).unwrap(), 1 << 63);
    }

    #[test]
    fn empty_string_marker_consumes_one_byte() {
        let mut cur = Cursor::new([0x00u8, 0xAB]);
        assert_eq!(read_string(&mut cur).unwrap(), "");
        assert_eq!(cur.position(), 1);
    }

    #[test]
    fn string_marker_consumes_exact_length() {
        let mut bytes = vec![0x0Bu8];
        bytes.extend_from_slice(&encode_uleb128(5));
        bytes.extend_from_slice(b"hello trailing");
        let mut cur = Cursor::new(bytes);
        assert_eq!(read_string(&mut cur).unwrap(), "hello");
        assert_eq!(cur.position(), 7);
    }

    #[test]
    fn bad_string_marker_is_rejected() {
        let err = read_string(&mut Cursor::new([0x0Au8, 0x01, b'x'])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn string_length_past_end_of_input() {
        let err = read_string(&mut Cursor::new([0x0Bu8, 0x05, b'a', b'b'])).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput));
    }

    #[test]
    fn string_must_be_utf8() {
        let err = read_string(&mut Cursor::new([0x0Bu8, 0x02, 0xFF, 0xFE])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    proptest! {
        #[test]
        fn uleb128_roundtrip(v in any::<u64>()) {
            let bytes = encode_uleb128(v);
            prop_assert!(bytes.len() <= 10);
            prop_assert_eq!(read_uleb128(&mut Cursor::new(bytes)).unwrap(), v);
        }

        #[test]
        fn string_roundtrip(s in "\\PC{0,64}") {
            let mut bytes = Vec::new();
            push_string(&mut bytes, &s);
            prop_assert_eq!(read_string(&mut Cursor::new(bytes)).unwrap(), s);
        }
    }

    #[test]
    fn life_graph_parses_records_and_skips_empty() {
        let points = parse_life_graph("0|1,1337|0.85,3000|0,").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].offset_ms, 1337);
        assert_eq!(points[1].life, 0.85);
        assert!(parse_life_graph("").unwrap().is_empty());
    }

    #[test]
    fn life_graph_rejects_malformed_records() {
        for bad in ["1000", "1000|", "|0.5", "a|0.5", "1000|x", "1|0.5|2"] {
            let err = parse_life_graph(bad).unwrap_err();
            assert!(
                matches!(err, DecodeError::MalformedLifeGraph(_)),
                "{:?} for {:?}",
                err,
                bad
            );
        }
    }

    #[test]
    fn header_fields_decode_exactly() {
        let h = ReplayHeader::read(Cursor::new(sample_header_bytes())).unwrap();
        assert_eq!(h.mode, GameMode::Osu);
        assert_eq!(h.version, 20131216);
        assert_eq!(h.beatmap_hash, "aee0e9f60ab66ae9fb6d9a0bd1a66ae9");
        assert_eq!(h.player_name, "cookiezi");
        assert_eq!(h.replay_hash, "bdca0bd1a66ae9fb6d9aee0e9f60ab66");
        assert_eq!(h.count_300, 1978);
        assert_eq!(h.count_100, 5);
        assert_eq!(h.count_50, 0);
        assert_eq!(h.count_geki, 247);
        assert_eq!(h.count_katu, 2);
        assert_eq!(h.count_miss, 1);
        assert_eq!(h.score, 132_408_001);
        assert_eq!(h.max_combo, 2385);
        assert!(!h.perfect);
        assert_eq!(h.mods, Mods::HIDDEN | Mods::HARD_ROCK);
        assert_eq!(h.life_graph.len(), 3);
        assert_eq!(h.recorded_at, 635_873_755_112_971_894);
        assert_eq!(h.payload_length, 0);
    }

    #[test]
    fn header_leaves_reader_at_payload() {
        let mut bytes = sample_header_bytes();
        bytes.extend_from_slice(b"PAYLOAD");
        let mut cur = Cursor::new(bytes);
        ReplayHeader::read(&mut cur).unwrap();
        let mut rest = Vec::new();
        cur.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"PAYLOAD");
    }

    #[test]
    fn other_modes_are_named_in_the_error() {
        for (byte, name) in [(1u8, "Taiko"), (2, "Catch the Beat"), (3, "osu!mania")] {
            let mut bytes = sample_header_bytes();
            bytes[0] = byte;
            let err = ReplayHeader::read(Cursor::new(bytes)).unwrap_err();
            assert!(matches!(err, DecodeError::UnsupportedMode(_)));
            assert_eq!(err.to_string(), format!("{} replays are not supported", name));
        }
    }

    #[test]
    fn unknown_mode_byte_is_malformed() {
        let mut bytes = sample_header_bytes();
        bytes[0] = 7;
        let err = ReplayHeader::read(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn every_truncation_point_reports_truncated_input() {
        let bytes = sample_header_bytes();
        for k in 0..bytes.len() {
            let err = ReplayHeader::read(Cursor::new(&bytes[..k])).unwrap_err();
            assert!(
                matches!(err, DecodeError::TruncatedInput),
                "prefix of {} bytes: {:?}",
                k,
                err
            );
        }
    }
}
