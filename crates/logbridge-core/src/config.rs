//! Configuration for the `log` facade sink

use log::LevelFilter;

/// How records from the `log` facade are filtered and formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Facade-wide maximum level while the sink is registered
    pub max_level: LevelFilter,
    /// Prefix messages with `file@line:` when the record carries a location
    pub include_location: bool,
}

impl FacadeConfig {
    pub fn with_max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_location(mut self, include_location: bool) -> Self {
        self.include_location = include_location;
        self
    }
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            max_level: LevelFilter::max(),
            include_location: true,
        }
    }
}
