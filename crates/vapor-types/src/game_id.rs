//! App and game identifiers.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A numeric identifier for a platform app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub u32);

impl AppId {
    /// The base game id for this app.
    pub fn game_id(self) -> GameId {
        GameId(u64::from(self.0))
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a [`GameId`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameIdType {
    App,
    GameMod,
    Shortcut,
    P2P,
    /// A type byte the platform doesn't define.
    Unknown(u8),
}

impl GameIdType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::App,
            1 => Self::GameMod,
            2 => Self::Shortcut,
            3 => Self::P2P,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::App => 0,
            Self::GameMod => 1,
            Self::Shortcut => 2,
            Self::P2P => 3,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Identifies an app, a mod of an app, or a shortcut to a non-platform game.
///
/// Layout: `crc32(name) | 0x8000_0000` in the top 32 bits (mods and
/// shortcuts only), the type in bits 24..32, the app id in bits 0..24.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl GameId {
    /// A mod of `app` living in the directory `path`.
    ///
    /// Only the final path component, without extension, feeds the hash.
    pub fn new_mod(app: AppId, path: impl AsRef<Path>) -> Self {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self(
            crc_high(&[stem.as_bytes()])
                | (u64::from(GameIdType::GameMod.raw()) << 24)
                | u64::from(app.0 & 0xFF_FFFF),
        )
    }

    /// A shortcut to an executable outside the platform library.
    pub fn new_shortcut(exe_path: &str, app_name: &str) -> Self {
        Self(
            crc_high(&[exe_path.as_bytes(), app_name.as_bytes()])
                | (u64::from(GameIdType::Shortcut.raw()) << 24),
        )
    }

    pub fn app_id(self) -> AppId {
        AppId((self.0 & 0xFF_FFFF) as u32)
    }

    pub fn kind(self) -> GameIdType {
        GameIdType::from_raw(((self.0 >> 24) & 0xFF) as u8)
    }
}

impl From<AppId> for GameId {
    fn from(app: AppId) -> Self {
        app.game_id()
    }
}

/// CRC-32 (IEEE) of the concatenated parts with the high bit forced on,
/// shifted into the top half.
fn crc_high(parts: &[&[u8]]) -> u64 {
    let mut crc = !0u32;
    for part in parts {
        for &byte in *part {
            crc = CRC_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
        }
    }
    u64::from(!crc | 0x8000_0000) << 32
}

const CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
};
