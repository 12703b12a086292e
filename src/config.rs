//! Tunable bounds for the parameter derivation.
//!
//! Every search performed by the crate is bounded. The defaults reproduce the
//! published Rescue-Prime parameter generator exactly; changing
//! `max_round_depth`, `min_rounds` or `round_margin` changes the derived round
//! count and therefore every constant downstream of it.

use serde::{Deserialize, Serialize};

use crate::error::{RescueError, Result};

/// Configuration for [`crate::ParameterAssembler`] and the components it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationConfig {
    /// Largest trial depth `l` examined by the Groebner-basis round search.
    pub max_round_depth: usize,

    /// Absolute floor applied to the trial depth before the margin.
    pub min_rounds: usize,

    /// Safety margin applied to the trial depth, as numerator / denominator.
    /// The default 3/2 adds 50%.
    pub round_margin: (usize, usize),

    /// Exclusive upper bound for the S-box exponent scan (further capped by `p`).
    pub alpha_search_limit: u64,

    /// Trial division bound used when factoring `p - 1`.
    pub trial_division_bound: u64,

    /// Total Pollard-Brent iterations allowed when factoring `p - 1`.
    pub rho_iteration_budget: u64,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            max_round_depth: 24,
            min_rounds: 5,
            round_margin: (3, 2),
            alpha_search_limit: 1 << 16,
            trial_division_bound: 1 << 20,
            rho_iteration_budget: 1 << 22,
        }
    }
}

impl DerivationConfig {
    /// Rejects configurations under which a search could never succeed.
    pub fn validate(&self) -> Result<()> {
        if self.max_round_depth == 0 {
            return Err(RescueError::InvalidParameters(
                "max_round_depth must be at least 1".to_string(),
            ));
        }
        if self.min_rounds == 0 {
            return Err(RescueError::InvalidParameters(
                "min_rounds must be at least 1".to_string(),
            ));
        }
        let (num, den) = self.round_margin;
        if den == 0 || num < den {
            return Err(RescueError::InvalidParameters(format!(
                "round_margin {}/{} must be a ratio >= 1",
                num, den
            )));
        }
        if self.alpha_search_limit <= 3 {
            return Err(RescueError::InvalidParameters(format!(
                "alpha_search_limit {} leaves no candidate exponent",
                self.alpha_search_limit
            )));
        }
        if self.trial_division_bound < 3 {
            return Err(RescueError::InvalidParameters(format!(
                "trial_division_bound {} is below the smallest odd prime",
                self.trial_division_bound
            )));
        }
        Ok(())
    }

    /// Applies the floor and the margin to a trial depth: `ceil(margin * max(floor, l))`.
    pub fn rounds_for_depth(&self, depth: usize) -> usize {
        let (num, den) = self.round_margin;
        let base = depth.max(self.min_rounds);
        (base * num + den - 1) / den
    }
}
