//! Gameplay-modifier bitfield carried in the replay header.
//!
//! The header stores active mods as a little-endian u32, one bit per mod,
//! 29 bits defined. Two rules matter for decoding:
//!
//!   - [`Mods::HARD_ROCK`] changes the geometry of the event stream
//!     (vertical mirror; see the timeline module).
//!   - Undefined bits are retained verbatim and skipped by name iteration.
//!     Newer clients set bits this table does not know, and rejecting them
//!     would reject otherwise valid replays.
//!
//! Checking a mod is an all-bits test (`contains`): `mods & m == m`.

use std::fmt;

use serde::{Serialize, Serializer};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mods: u32 {
        const NO_FAIL         = 1 << 0;
        const EASY            = 1 << 1;
        const NO_VIDEO        = 1 << 2;
        const HIDDEN          = 1 << 3;
        const HARD_ROCK       = 1 << 4;
        const SUDDEN_DEATH    = 1 << 5;
        const DOUBLE_TIME     = 1 << 6;
        const RELAX           = 1 << 7;
        const HALF_TIME       = 1 << 8;
        const NIGHTCORE       = 1 << 9;
        const FLASHLIGHT      = 1 << 10;
        const AUTOPLAY        = 1 << 11;
        const SPUN_OUT        = 1 << 12;
        const AUTOPILOT       = 1 << 13;
        const PERFECT         = 1 << 14;
        const KEY4            = 1 << 15;
        const KEY5            = 1 << 16;
        const KEY6            = 1 << 17;
        const KEY7            = 1 << 18;
        const KEY8            = 1 << 19;
        const FADE_IN         = 1 << 20;
        const RANDOM          = 1 << 21;
        const CINEMA          = 1 << 22;
        const TARGET_PRACTICE = 1 << 23;
        const KEY9            = 1 << 24;
        const COOP            = 1 << 25;
        const KEY1            = 1 << 26;
        const KEY3            = 1 << 27;
        const KEY2            = 1 << 28;
    }
}

// ── Name tables ──────────────────────────────────────────────────────────────
//
// One row per defined bit, in bit order. The short codes are the two-character
// scoreboard abbreviations; NoVideo and Cinema never had one.

const MOD_TABLE: [(Mods, &str, Option<&str>); 29] = [
    (Mods::NO_FAIL,         "NoFail",         Some("NF")),
    (Mods::EASY,            "Easy",           Some("EZ")),
    (Mods::NO_VIDEO,        "NoVideo",        None),
    (Mods::HIDDEN,          "Hidden",         Some("HD")),
    (Mods::HARD_ROCK,       "HardRock",       Some("HR")),
    (Mods::SUDDEN_DEATH,    "SuddenDeath",    Some("SD")),
    (Mods::DOUBLE_TIME,     "DoubleTime",     Some("DT")),
    (Mods::RELAX,           "Relax",          Some("RX")),
    (Mods::HALF_TIME,       "HalfTime",       Some("HT")),
    (Mods::NIGHTCORE,       "NightCore",      Some("NC")),
    (Mods::FLASHLIGHT,      "Flashlight",     Some("FL")),
    (Mods::AUTOPLAY,        "Autoplay",       Some("AO")),
    (Mods::SPUN_OUT,        "SpunOut",        Some("SO")),
    (Mods::AUTOPILOT,       "Autopilot",      Some("AP")),
    (Mods::PERFECT,         "Perfect",        Some("PF")),
    (Mods::KEY4,            "Key4",           Some("4K")),
    (Mods::KEY5,            "Key5",           Some("5K")),
    (Mods::KEY6,            "Key6",           Some("6K")),
    (Mods::KEY7,            "Key7",           Some("7K")),
    (Mods::KEY8,            "Key8",           Some("8K")),
    (Mods::FADE_IN,         "FadeIn",         Some("FI")),
    (Mods::RANDOM,          "Random",         Some("RD")),
    (Mods::CINEMA,          "Cinema",         None),
    (Mods::TARGET_PRACTICE, "TargetPractice", Some("TP")),
    (Mods::KEY9,            "Key9",           Some("9K")),
    (Mods::COOP,            "Co-op",          Some("CO")),
    (Mods::KEY1,            "Key1",           Some("1K")),
    (Mods::KEY3,            "Key3",           Some("3K")),
    (Mods::KEY2,            "Key2",           Some("2K")),
];

impl Mods {
    /// Concatenated short codes in bit order, e.g. `HDHR`.
    /// Mods without a code are skipped; no mods yields an empty string.
    pub fn short_string(&self) -> String {
        let mut s = String::new();
        for (flag, _, short) in MOD_TABLE {
            if self.contains(flag) {
                if let Some(code) = short {
                    s.push_str(code);
                }
            }
        }
        s
    }
}

/// Comma-joined long names in bit order (stable, unlike set iteration).
impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name, _) in MOD_TABLE {
            if self.contains(flag) {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// Serialized as the raw bitfield so undefined bits survive a JSON round
// through external tooling.
impl Serialize for Mods {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}
