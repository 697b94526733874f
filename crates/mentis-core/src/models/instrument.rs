use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The closed set of instruments the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Npq,
    Dsm,
    Asrs,
    Sat,
    Unknown,
}

impl InstrumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Npq => "npq",
            InstrumentKind::Dsm => "dsm",
            InstrumentKind::Asrs => "asrs",
            InstrumentKind::Sat => "sat",
            InstrumentKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "npq" => Ok(InstrumentKind::Npq),
            "dsm" => Ok(InstrumentKind::Dsm),
            "asrs" => Ok(InstrumentKind::Asrs),
            "sat" => Ok(InstrumentKind::Sat),
            "unknown" => Ok(InstrumentKind::Unknown),
            other => Err(CoreError::UnknownInstrument(other.to_string())),
        }
    }
}
