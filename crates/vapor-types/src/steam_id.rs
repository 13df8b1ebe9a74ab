//! The 64-bit account identity.
//!
//! A `SteamId` packs four fields into one `u64`:
//!
//! ```text
//!  63      56 55  52 51                32 31                             0
//! ┌──────────┬──────┬────────────────────┬────────────────────────────────┐
//! │ universe │ type │      instance      │           account id           │
//! │  8 bits  │4 bits│      20 bits       │            32 bits             │
//! └──────────┴──────┴────────────────────┴────────────────────────────────┘
//! ```
//!
//! Values are never mutated after creation; every accessor is a shift
//! and a mask.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AccountType
// ---------------------------------------------------------------------------

/// The kind of account a [`SteamId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Invalid,
    Individual,
    Multiseat,
    GameServer,
    AnonGameServer,
    Pending,
    ContentServer,
    Clan,
    Chat,
    P2PSuperSeeder,
    AnonUser,
}

impl AccountType {
    /// Maps the 4-bit raw field to a variant. Values past `AnonUser`
    /// are not defined by the platform and return `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Invalid,
            1 => Self::Individual,
            2 => Self::Multiseat,
            3 => Self::GameServer,
            4 => Self::AnonGameServer,
            5 => Self::Pending,
            6 => Self::ContentServer,
            7 => Self::Clan,
            8 => Self::Chat,
            9 => Self::P2PSuperSeeder,
            10 => Self::AnonUser,
            _ => return None,
        })
    }

    /// The raw 4-bit value.
    pub fn raw(self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::Individual => 1,
            Self::Multiseat => 2,
            Self::GameServer => 3,
            Self::AnonGameServer => 4,
            Self::Pending => 5,
            Self::ContentServer => 6,
            Self::Clan => 7,
            Self::Chat => 8,
            Self::P2PSuperSeeder => 9,
            Self::AnonUser => 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Universe
// ---------------------------------------------------------------------------

/// Which platform universe an account lives in. Almost everything
/// a game sees is [`Universe::Public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Universe {
    Invalid,
    Public,
    Beta,
    Internal,
    Dev,
}

impl Universe {
    /// Maps the 8-bit raw field to a variant.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Invalid,
            1 => Self::Public,
            2 => Self::Beta,
            3 => Self::Internal,
            4 => Self::Dev,
            _ => return None,
        })
    }

    /// The raw 8-bit value.
    pub fn raw(self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::Public => 1,
            Self::Beta => 2,
            Self::Internal => 3,
            Self::Dev => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// The 20-bit instance field.
///
/// For individual accounts this is one of the desktop/console/web values.
/// Chat accounts carry flags in the top bits instead, leaving 12 bits for
/// the actual instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instance(pub u32);

impl Instance {
    pub const ALL: Instance = Instance(0);
    pub const DESKTOP: Instance = Instance(1 << 0);
    pub const CONSOLE: Instance = Instance(1 << 1);
    pub const WEB: Instance = Instance(1 << 2);

    pub const FLAG_CLAN: Instance = Instance(1 << 19);
    pub const FLAG_LOBBY: Instance = Instance(1 << 18);
    pub const FLAG_MMS_LOBBY: Instance = Instance(1 << 17);

    const MASK: u32 = 0xF_FFFF;
}

// ---------------------------------------------------------------------------
// SteamId
// ---------------------------------------------------------------------------

/// A platform account identity.
///
/// Serialized as the bare `u64`, so `SteamId(76561197960265729)` becomes
/// `76561197960265729` in JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(pub u64);

impl SteamId {
    /// Packs the four fields into an identity.
    ///
    /// The instance is masked to its 20 bits.
    pub fn new(
        account_id: u32,
        instance: Instance,
        account_type: AccountType,
        universe: Universe,
    ) -> Self {
        let raw = (u64::from(universe.raw()) << 56)
            | (u64::from(account_type.raw()) << 52)
            | (u64::from(instance.0 & Instance::MASK) << 32)
            | u64::from(account_id);
        Self(raw)
    }

    /// The low 32 bits.
    pub fn account_id(self) -> u32 {
        self.0 as u32
    }

    pub fn instance(self) -> Instance {
        Instance(((self.0 >> 32) & u64::from(Instance::MASK)) as u32)
    }

    /// `None` when the type bits hold a value the platform doesn't define.
    pub fn account_type(self) -> Option<AccountType> {
        AccountType::from_raw(((self.0 >> 52) & 0xF) as u8)
    }

    /// `None` when the universe byte holds a value the platform doesn't define.
    pub fn universe(self) -> Option<Universe> {
        Universe::from_raw((self.0 >> 56) as u8)
    }

    /// Whether this identity is well formed.
    ///
    /// Rejects invalid or undefined type and universe values, then applies
    /// the per-type rules: individuals need a nonzero account and a
    /// desktop/console/web instance, clans need a nonzero account and no
    /// instance, game servers need a nonzero account.
    pub fn is_valid(self) -> bool {
        let account_type = match self.account_type() {
            None | Some(AccountType::Invalid) => return false,
            Some(t) => t,
        };

        match self.universe() {
            None | Some(Universe::Invalid) => return false,
            Some(_) => {}
        }

        match account_type {
            AccountType::Individual => {
                self.account_id() != 0 && self.instance() <= Instance::WEB
            }
            AccountType::Clan => {
                self.account_id() != 0 && self.instance() == Instance::ALL
            }
            AccountType::GameServer => self.account_id() != 0,
            _ => true,
        }
    }

    /// The legacy `STEAM_X:Y:Z` rendering for individual (and invalid)
    /// accounts, or the decimal value for every other type.
    pub fn steam2_string(self) -> String {
        match self.account_type() {
            Some(AccountType::Invalid | AccountType::Individual) => {
                let universe = self.0 >> 56;
                let account_id = self.account_id();
                format!("STEAM_{}:{}:{}", universe, account_id & 1, account_id >> 1)
            }
            _ => self.0.to_string(),
        }
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.steam2_string())
    }
}

impl From<u64> for SteamId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<SteamId> for u64 {
    fn from(id: SteamId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// account 1, individual, public, desktop: the canonical "first user".
    const KNOWN_GOOD: u64 = 76_561_197_960_265_729;

    fn individual(account_id: u32) -> SteamId {
        SteamId::new(account_id, Instance::DESKTOP, AccountType::Individual, Universe::Public)
    }

    #[test]
    fn test_new_matches_known_literal() {
        assert_eq!(individual(1), SteamId(KNOWN_GOOD));
    }

    #[test]
    fn test_accessors_round_trip_known_literal() {
        let id = SteamId(KNOWN_GOOD);
        assert_eq!(id.account_id(), 1);
        assert_eq!(id.instance(), Instance::DESKTOP);
        assert_eq!(id.account_type(), Some(AccountType::Individual));
        assert_eq!(id.universe(), Some(Universe::Public));
    }

    #[test]
    fn test_is_valid_well_formed_individual_true() {
        assert!(individual(1).is_valid());
    }

    #[test]
    fn test_is_valid_type_zero_false() {
        let id = SteamId::new(1, Instance::DESKTOP, AccountType::Invalid, Universe::Public);
        assert!(!id.is_valid());
    }

    #[test]
    fn test_is_valid_undefined_type_false() {
        // type bits = 11, one past AnonUser
        let id = SteamId((1u64 << 56) | (11u64 << 52) | (1u64 << 32) | 1);
        assert_eq!(id.account_type(), None);
        assert!(!id.is_valid());
    }

    #[test]
    fn test_is_valid_undefined_universe_false() {
        let id = SteamId((5u64 << 56) | (1u64 << 52) | (1u64 << 32) | 1);
        assert_eq!(id.universe(), None);
        assert!(!id.is_valid());
    }

    #[test]
    fn test_is_valid_invalid_universe_false() {
        let id = SteamId::new(1, Instance::DESKTOP, AccountType::Individual, Universe::Invalid);
        assert!(!id.is_valid());
    }

    #[test]
    fn test_is_valid_individual_zero_account_false() {
        assert!(!individual(0).is_valid());
    }

    #[test]
    fn test_is_valid_individual_instance_past_web_false() {
        let id = SteamId::new(7, Instance(8), AccountType::Individual, Universe::Public);
        assert!(!id.is_valid());
    }

    #[test]
    fn test_is_valid_clan_with_instance_false() {
        let ok = SteamId::new(7, Instance::ALL, AccountType::Clan, Universe::Public);
        let bad = SteamId::new(7, Instance::DESKTOP, AccountType::Clan, Universe::Public);
        assert!(ok.is_valid());
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_is_valid_game_server_zero_account_false() {
        let id = SteamId::new(0, Instance::ALL, AccountType::GameServer, Universe::Public);
        assert!(!id.is_valid());
    }

    #[test]
    fn test_is_valid_zero_false() {
        assert!(!SteamId::default().is_valid());
    }

    #[test]
    fn test_new_masks_instance_to_twenty_bits() {
        let id = SteamId::new(1, Instance(0xFFF_FFFF), AccountType::Chat, Universe::Public);
        assert_eq!(id.instance(), Instance(0xF_FFFF));
        assert_eq!(id.account_type(), Some(AccountType::Chat));
    }

    #[test]
    fn test_display_individual_uses_steam2_format() {
        // account 3 → Y = 1, Z = 1
        assert_eq!(individual(3).to_string(), "STEAM_1:1:1");
    }

    #[test]
    fn test_display_game_server_uses_decimal() {
        let id = SteamId::new(9, Instance::ALL, AccountType::GameServer, Universe::Public);
        assert_eq!(id.to_string(), id.0.to_string());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&SteamId(KNOWN_GOOD)).unwrap();
        assert_eq!(json, KNOWN_GOOD.to_string());
        let back: SteamId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SteamId(KNOWN_GOOD));
    }
}
