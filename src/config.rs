// ⚙️ Engine Configuration - tunable windows for time-based classification

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// A payment older than this many days is late (default: 30)
    pub late_payment_days: i64,
}

impl EngineConfig {
    pub fn new() -> Self {
        EngineConfig {
            late_payment_days: 30,
        }
    }

    pub fn with_late_payment_days(mut self, days: i64) -> Self {
        self.late_payment_days = days;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let config = EngineConfig::default();
        assert_eq!(config.late_payment_days, 30);
    }

    #[test]
    fn test_builder_override() {
        let config = EngineConfig::new().with_late_payment_days(45);
        assert_eq!(config.late_payment_days, 45);
    }
}
