//! Reward currency vocabulary.
//!
//! The catalog references rewards by open string keys. The table is
//! plain data built once at startup and passed by reference wherever a
//! key needs validating or displaying; any key set may be supplied, but
//! every key the catalog references must be present, so a typo in a
//! hand-edited file fails the load instead of minting a currency.

/// One reward currency: its key as used in the catalog files and a
/// human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardKind {
    pub key: String,
    pub label: String,
}

/// Static form for the built-in vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct RewardKindDef {
    pub key: &'static str,
    pub label: &'static str,
}

/// Currencies of the base game, in display order.
pub const BASE_GAME_REWARDS: &[RewardKindDef] = &[
    RewardKindDef {
        key: "bp",
        label: "BP",
    },
    RewardKindDef {
        key: "silver",
        label: "Silver Fragments",
    },
    RewardKindDef {
        key: "classic_crate_coupon",
        label: "Classic Crate Coupon",
    },
    RewardKindDef {
        key: "premium_crate_coupon",
        label: "Premium Crate Coupon",
    },
];

#[derive(Debug, Clone)]
pub struct RewardTable {
    kinds: Vec<RewardKind>,
}

impl RewardTable {
    /// The built-in vocabulary.
    pub fn base_game() -> Self {
        Self::from_kinds(
            BASE_GAME_REWARDS
                .iter()
                .map(|def| RewardKind {
                    key: def.key.to_string(),
                    label: def.label.to_string(),
                })
                .collect(),
        )
    }

    pub fn from_kinds(kinds: Vec<RewardKind>) -> Self {
        Self { kinds }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kinds.iter().any(|k| k.key == key)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.kinds
            .iter()
            .find(|k| k.key == key)
            .map(|k| k.label.as_str())
    }

    /// Keys in display order.
    pub fn keys(&self) -> Vec<&str> {
        self.kinds.iter().map(|k| k.key.as_str()).collect()
    }
}
