use crate::error::{ConfigError, Result};

/// Weights combined into a splitter candidate's score. Lower scores win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitWeights {
    /// Added once when the splitter is neither horizontal nor vertical.
    pub not_axis_aligned: i64,
    /// Added per segment whose intersection lands near, but not at, an
    /// endpoint.
    pub near_endpoint_split: i64,
    /// Multiplied by `|left - right|` segment counts.
    pub left_right_imbalance: i64,
    /// Multiplied by the number of segments the splitter would cut.
    pub split_count: i64,
}

impl Default for SplitWeights {
    fn default() -> Self {
        Self {
            not_axis_aligned: 5,
            near_endpoint_split: 1000,
            left_right_imbalance: 1,
            split_count: 10,
        }
    }
}

/// Which child of a split gets built first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchOrder {
    #[default]
    LeftFirst,
    RightFirst,
}

/// Settings for one BSP build.
#[derive(Debug, Clone, PartialEq)]
pub struct BspConfig {
    /// Points closer than this (in map units) are the same vertex.
    pub vertex_weld_epsilon: f64,
    /// Splits closer than this to an endpoint are punished.
    pub punishable_endpoint_distance: f64,
    pub split_weights: SplitWeights,
    pub branch_order: BranchOrder,
    /// Upper bound on work items created during one build.
    pub max_work_items: usize,
    /// Remove dangling chains of segments before building.
    pub prune_dangling_chains: bool,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            vertex_weld_epsilon: 0.005,
            punishable_endpoint_distance: 0.1,
            split_weights: SplitWeights::default(),
            branch_order: BranchOrder::default(),
            max_work_items: 10_000,
            prune_dangling_chains: true,
        }
    }
}

impl BspConfig {
    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidParameter` for a non-finite or
    /// non-positive epsilon, a punishable distance below the welding epsilon,
    /// a negative weight, or a zero work item ceiling.
    pub fn validate(&self) -> Result<()> {
        if !self.vertex_weld_epsilon.is_finite() || self.vertex_weld_epsilon <= 0.0 {
            return Err(invalid(
                "vertex_weld_epsilon",
                self.vertex_weld_epsilon,
                "must be finite and positive",
            ));
        }
        if !self.punishable_endpoint_distance.is_finite()
            || self.punishable_endpoint_distance < self.vertex_weld_epsilon
        {
            return Err(invalid(
                "punishable_endpoint_distance",
                self.punishable_endpoint_distance,
                "must be finite and at least the welding epsilon",
            ));
        }

        let w = &self.split_weights;
        for (name, value) in [
            ("split_weights.not_axis_aligned", w.not_axis_aligned),
            ("split_weights.near_endpoint_split", w.near_endpoint_split),
            ("split_weights.left_right_imbalance", w.left_right_imbalance),
            ("split_weights.split_count", w.split_count),
        ] {
            if value < 0 {
                #[allow(clippy::cast_precision_loss)]
                return Err(invalid(name, value as f64, "must not be negative"));
            }
        }

        if self.max_work_items == 0 {
            return Err(invalid("max_work_items", 0.0, "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> crate::error::BspError {
    ConfigError::InvalidParameter {
        name,
        value,
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BspConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.branch_order, BranchOrder::LeftFirst);
        assert_eq!(config.max_work_items, 10_000);
    }

    #[test]
    fn rejects_bad_epsilon() {
        let config = BspConfig {
            vertex_weld_epsilon: 0.0,
            ..BspConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BspConfig {
            vertex_weld_epsilon: f64::NAN,
            ..BspConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_punish_distance_below_epsilon() {
        let config = BspConfig {
            punishable_endpoint_distance: 0.001,
            ..BspConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_weight() {
        let config = BspConfig {
            split_weights: SplitWeights {
                split_count: -1,
                ..SplitWeights::default()
            },
            ..BspConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_ceiling() {
        let config = BspConfig {
            max_work_items: 0,
            ..BspConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
