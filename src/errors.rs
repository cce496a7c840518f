//! Error types for catalog loading, toggling, and saving.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems found while loading the achievement catalog.
///
/// There is no partial-catalog mode: any of these aborts startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("achievement {title:?}: field `{field}` must be \"0\" or \"1\", got {value:?}")]
    InvalidFlag {
        title: String,
        field: &'static str,
        value: String,
    },
    #[error("leveled achievement {title:?} has an empty tier list")]
    EmptyLevels { title: String },
    #[error("leveled achievement {title:?}: tier {found:?} where {expected:?} was expected")]
    TierOrder {
        title: String,
        expected: String,
        found: String,
    },
    #[error("duplicate achievement title {title:?}")]
    DuplicateTitle { title: String },
    #[error("achievement {title:?} references unknown reward {reward:?}")]
    UnknownReward { title: String, reward: String },
}

/// A toggle request that named a record or tier that does not exist.
///
/// These are caller bugs, not user input errors; a toggle returning one
/// of these has not changed any state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    #[error("no achievement at index {0}")]
    BadIndex(usize),
    #[error("achievement {title:?} has no tier {tier}")]
    BadTier { title: String, tier: usize },
    #[error("achievement {title:?} is leveled; a tier must be given")]
    TierRequired { title: String },
    #[error("achievement {title:?} has no tiers")]
    NotLeveled { title: String },
}

/// Failure writing the catalog back to disk.
///
/// In-memory state is untouched; the caller may retry once the
/// underlying condition clears.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not serialize {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
