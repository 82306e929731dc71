use serde::{Deserialize, Serialize};

use crate::measure::Measurement;

/// Size limit of one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBudget {
    pub max_chars: usize,
    pub max_entities: usize,
}

impl SizeBudget {
    pub const fn new(max_chars: usize, max_entities: usize) -> Self {
        Self {
            max_chars,
            max_entities,
        }
    }

    pub fn fits(&self, measurement: Measurement) -> bool {
        measurement.text_len <= self.max_chars && measurement.entity_count <= self.max_entities
    }
}

/// Budgets for the primary card and its continuation pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerBudgets {
    /// Media caption limit
    pub card: SizeBudget,
    /// Plain text message limit
    pub page: SizeBudget,
}

impl Default for ComposerBudgets {
    fn default() -> Self {
        Self {
            card: SizeBudget::new(1024, 100),
            page: SizeBudget::new(4096, 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_checks_both_limits() {
        let budget = SizeBudget::new(10, 2);
        let m = |text_len, entity_count| Measurement {
            text_len,
            entity_count,
        };
        assert!(budget.fits(m(10, 2)));
        assert!(!budget.fits(m(11, 0)));
        assert!(!budget.fits(m(0, 3)));
    }
}
