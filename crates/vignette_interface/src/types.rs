//! Shared types for the service contracts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Requested photo orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// 9:16-friendly portrait crops
    Portrait,
    /// Landscape crops
    Landscape,
}

impl Orientation {
    /// Query-parameter value for the provider API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// One stock photo listing returned by a search.
///
/// `sources` maps provider size keys (e.g. `large2x`) to download URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPhoto {
    /// Provider photo id, used for the dedup history
    pub id: u64,
    /// Attribution name
    pub photographer: String,
    /// Download URLs keyed by size
    pub sources: HashMap<String, String>,
}
