//! Lead lifecycle stages.
//!
//! The stage order is total and forward-only: a lead never moves backwards.
//! The database guard in `leadfetch-db` relies on [`LeadStage::stages_below`]
//! to express "strictly earlier than" as a bound parameter list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a lead in the outreach lifecycle.
///
/// Variant order defines the lifecycle order; `PartialOrd`/`Ord` derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStage {
    Prospect,
    Contacted,
    Responded,
    Qualified,
}

impl LeadStage {
    pub const ALL: [LeadStage; 4] = [
        LeadStage::Prospect,
        LeadStage::Contacted,
        LeadStage::Responded,
        LeadStage::Qualified,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStage::Prospect => "prospect",
            LeadStage::Contacted => "contacted",
            LeadStage::Responded => "responded",
            LeadStage::Qualified => "qualified",
        }
    }

    /// Stage names strictly earlier in the lifecycle than `self`.
    ///
    /// Used as the match set for the forward-only stage-advance query: a row
    /// may only transition to `self` if its current stage is in this list.
    #[must_use]
    pub fn stages_below(self) -> Vec<&'static str> {
        Self::ALL
            .iter()
            .take_while(|s| **s < self)
            .map(|s| s.as_str())
            .collect()
    }
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown lead stage: {0}")]
pub struct UnknownStage(String);

impl FromStr for LeadStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prospect" => Ok(LeadStage::Prospect),
            "contacted" => Ok(LeadStage::Contacted),
            "responded" => Ok(LeadStage::Responded),
            "qualified" => Ok(LeadStage::Qualified),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}
