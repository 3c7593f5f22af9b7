//! Error type shared by every module of the crate.

use thiserror::Error;

use crate::models::RecipeId;

/// Errors raised while loading data, fetching prices or computing a path.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is not a valid faction. Valid factions: [\"horde\", \"alliance\"].")]
    InvalidFaction(String),

    #[error("{0} is not a known server")]
    UnknownServer(String),

    /// Yellow and gray thresholds are equal, so the skill-up probability divides by zero.
    #[error("failed to get level-up probability for {name} ({id}): yellow and gray thresholds are both {threshold}")]
    DegenerateBand {
        id: RecipeId,
        name: String,
        threshold: u32,
    },

    #[error("recipe {name} ({id}) has difficulty thresholds out of order: {colors:?}")]
    InvalidBand {
        id: RecipeId,
        name: String,
        colors: [u32; 4],
    },

    #[error("no `listviewspells` list found in page")]
    MissingListview,

    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
