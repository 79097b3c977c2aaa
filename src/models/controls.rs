//! Dashboard control models

use std::fmt;
use std::str::FromStr;

/// Currency the gold chart is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    /// Raw XAU→USD quotes
    Usd,
    /// Gold converted to the local currency through the USD rate
    Local,
}

pub const LOCAL_UNIT: &str = "IRR";

impl FromStr for DisplayUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usd" | "$" => Ok(DisplayUnit::Usd),
            "irr" | "local" | "rial" => Ok(DisplayUnit::Local),
            _ => Err(format!("❌ Unknown unit: '{}'. Supported: USD, IRR", s)),
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayUnit::Usd => write!(f, "USD"),
            DisplayUnit::Local => write!(f, "{}", LOCAL_UNIT),
        }
    }
}

/// Current values of the page controls
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub mode: String,
    pub category: String,
    pub unit: DisplayUnit,
    /// Timeframe text as typed, e.g. `30d` or `all`
    pub range: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            mode: "daily".to_string(),
            category: "all".to_string(),
            unit: DisplayUnit::Usd,
            range: "30d".to_string(),
        }
    }
}
