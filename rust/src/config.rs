//! Configuration types for the scheduling engine.

use serde::{Deserialize, Serialize};

/// How the graph builder treats a link that cannot be honoured as written.
///
/// Covers links naming unknown tasks, duplicate link ids and anchors placed on
/// tasks that have predecessors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkValidation {
    /// Any offending link aborts the computation.
    Strict,
    /// Offending links are dropped and reported as warnings on the schedule.
    #[default]
    Lenient,
}

/// Configuration for one schedule computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Strict or lenient handling of malformed links.
    pub link_validation: LinkValidation,
    /// A task is critical when its total float is at most this many units.
    pub float_epsilon: i64,
    /// Upper bound on the number of critical paths enumerated.
    pub max_critical_paths: usize,
    /// Verbosity level: 0=silent, 1=summary, 2=constraints, 3=debug.
    pub verbosity: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            link_validation: LinkValidation::Lenient,
            float_epsilon: 0,
            max_critical_paths: 1024,
            verbosity: 0,
        }
    }
}

impl ScheduleConfig {
    /// Default configuration with strict link validation.
    pub fn strict() -> Self {
        Self {
            link_validation: LinkValidation::Strict,
            ..Self::default()
        }
    }

    pub fn is_strict(&self) -> bool {
        self.link_validation == LinkValidation::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.link_validation, LinkValidation::Lenient);
        assert_eq!(config.float_epsilon, 0);
        assert_eq!(config.max_critical_paths, 1024);
        assert_eq!(config.verbosity, 0);
        assert!(!config.is_strict());
        assert!(ScheduleConfig::strict().is_strict());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ScheduleConfig =
            serde_json::from_str(r#"{"link_validation": "strict", "float_epsilon": 1}"#).unwrap();
        assert!(config.is_strict());
        assert_eq!(config.float_epsilon, 1);
        assert_eq!(config.max_critical_paths, 1024);
    }
}
