//! Adaptive search budget driven by the match score.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mcts::SearchBudget;

/// Which budget a decision ran with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetMode {
    /// Comfortably ahead: search less.
    Mercy,
    Baseline,
    /// Far behind: search more, for longer.
    Panic,
}

impl fmt::Display for BudgetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BudgetMode::Mercy => "mercy",
            BudgetMode::Baseline => "baseline",
            BudgetMode::Panic => "panic",
        };
        f.write_str(name)
    }
}

/// Budget thresholds and sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub baseline_iterations: u32,
    pub mercy_iterations: u32,
    pub panic_iterations: u32,

    /// Lead (us - them) at which mercy starts.
    pub mercy_lead: i32,

    /// Deficit (them - us) at which panic starts.
    pub panic_deficit: i32,

    pub time_limit_ms: u64,

    /// Time limit multiplier in panic mode.
    pub panic_time_factor: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            baseline_iterations: 800,
            mercy_iterations: 250,
            panic_iterations: 2000,
            mercy_lead: 100,
            panic_deficit: 100,
            time_limit_ms: 1500,
            panic_time_factor: 2,
        }
    }
}

/// Maps a score differential to a [`SearchBudget`].
#[derive(Clone, Debug, Default)]
pub struct AdaptiveBudget {
    config: BudgetConfig,
}

impl AdaptiveBudget {
    #[must_use]
    pub fn new(config: BudgetConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self, differential: i32) -> BudgetMode {
        if differential >= self.config.mercy_lead {
            BudgetMode::Mercy
        } else if differential.saturating_neg() >= self.config.panic_deficit {
            BudgetMode::Panic
        } else {
            BudgetMode::Baseline
        }
    }

    /// Budget for a decision with `differential = us - them`.
    #[must_use]
    pub fn plan(&self, differential: i32) -> (BudgetMode, SearchBudget) {
        let mode = self.mode(differential);
        let base = Duration::from_millis(self.config.time_limit_ms);
        let (iterations, time) = match mode {
            BudgetMode::Mercy => (self.config.mercy_iterations, base),
            BudgetMode::Baseline => (self.config.baseline_iterations, base),
            BudgetMode::Panic => (
                self.config.panic_iterations,
                base.saturating_mul(self.config.panic_time_factor.max(1)),
            ),
        };
        (mode, SearchBudget::iterations(iterations).with_time_limit(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        let budget = AdaptiveBudget::default();
        assert_eq!(budget.mode(0), BudgetMode::Baseline);
        assert_eq!(budget.mode(99), BudgetMode::Baseline);
        assert_eq!(budget.mode(100), BudgetMode::Mercy);
        assert_eq!(budget.mode(-99), BudgetMode::Baseline);
        assert_eq!(budget.mode(-100), BudgetMode::Panic);
        assert_eq!(budget.mode(i32::MIN), BudgetMode::Panic);
    }

    #[test]
    fn test_plan_sizes() {
        let budget = AdaptiveBudget::default();

        let (mode, plan) = budget.plan(150);
        assert_eq!(mode, BudgetMode::Mercy);
        assert_eq!(plan.max_iterations, 250);
        assert_eq!(plan.time_limit, Some(Duration::from_millis(1500)));

        let (_, plan) = budget.plan(0);
        assert_eq!(plan.max_iterations, 800);

        let (mode, plan) = budget.plan(-200);
        assert_eq!(mode, BudgetMode::Panic);
        assert_eq!(plan.max_iterations, 2000);
        assert_eq!(plan.time_limit, Some(Duration::from_millis(3000)));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BudgetMode::Panic.to_string(), "panic");
    }

    #[test]
    fn test_config_serialization() {
        let config = BudgetConfig {
            mercy_lead: 60,
            ..BudgetConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: BudgetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
