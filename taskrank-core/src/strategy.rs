//! Named weighting strategies.
//!
//! The preset table is a compile-time constant. Lookup by name is exact and
//! lenient: an unknown name resolves to `smart_balance` without an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::PriorityEngine;
use crate::error::UnknownStrategy;
use crate::time::Clock;

/// Relative influence of each factor. Conventionally sums to 1.0; not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependencies: f64,
}

impl WeightVector {
    pub const fn new(urgency: f64, importance: f64, effort: f64, dependencies: f64) -> Self {
        Self {
            urgency,
            importance,
            effort,
            dependencies,
        }
    }

    pub fn sum(&self) -> f64 {
        self.urgency + self.importance + self.effort + self.dependencies
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Strategy::SmartBalance.weights()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Balanced across all factors.
    #[default]
    SmartBalance,
    /// Favors low-effort tasks.
    FastestWins,
    /// Favors importance.
    HighImpact,
    /// Favors the nearest deadlines.
    DeadlineDriven,
}

static PRESETS: [(Strategy, &str, WeightVector); 4] = [
    (Strategy::SmartBalance, "smart_balance", WeightVector::new(0.35, 0.30, 0.20, 0.15)),
    (Strategy::FastestWins, "fastest_wins", WeightVector::new(0.20, 0.25, 0.45, 0.10)),
    (Strategy::HighImpact, "high_impact", WeightVector::new(0.25, 0.50, 0.15, 0.10)),
    (Strategy::DeadlineDriven, "deadline_driven", WeightVector::new(0.60, 0.20, 0.10, 0.10)),
];

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::SmartBalance,
        Strategy::FastestWins,
        Strategy::HighImpact,
        Strategy::DeadlineDriven,
    ];

    fn preset(self) -> &'static (Strategy, &'static str, WeightVector) {
        &PRESETS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.preset().1
    }

    pub fn weights(self) -> WeightVector {
        self.preset().2
    }

    /// Lenient lookup: unknown names fall back to [`Strategy::SmartBalance`].
    pub fn resolve(name: &str) -> Strategy {
        match name.parse() {
            Ok(s) => s,
            Err(UnknownStrategy(name)) => {
                tracing::warn!(%name, "unknown strategy, using smart_balance");
                Strategy::SmartBalance
            }
        }
    }

    pub fn engine(self) -> PriorityEngine {
        PriorityEngine::new(self.weights())
    }

    pub fn engine_with_clock<C: Clock>(self, clock: C) -> PriorityEngine<C> {
        PriorityEngine::with_clock(self.weights(), clock)
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    /// Strict, case-sensitive lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PRESETS
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(strategy, _, _)| *strategy)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine configured for the named strategy (lenient lookup).
pub fn engine_for(name: &str) -> PriorityEngine {
    Strategy::resolve(name).engine()
}
