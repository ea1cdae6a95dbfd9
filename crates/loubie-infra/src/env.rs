use crate::prelude::*;
use derive_more::{Display, FromStr};

///
/// Environment
///
/// Closed set of deployment environments. Every downstream decision
/// (naming, origins, policy, output qualification) is keyed off exactly
/// one resolved member of this set.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[display("dev")]
    Dev,

    #[display("prod")]
    Prod,
}

impl Environment {
    pub const ALL: [Self; 2] = [Self::Dev, Self::Prod];

    /// Resolve a requested environment identifier to a profile.
    ///
    /// Total over any input: absent, empty, and unrecognized identifiers
    /// all resolve to [`Environment::Dev`]. Silent fallback is the chosen
    /// policy (over hard failure on unknown identifiers) to match the
    /// deployment tool's context-lookup behavior; a typo therefore
    /// deploys under dev naming rather than aborting the run.
    #[must_use]
    pub fn resolve(requested: Option<&str>) -> Self {
        requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<Self>().ok())
            .unwrap_or_default()
    }
}
