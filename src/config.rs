use std::path::PathBuf;

/// Timing settings of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Interval between two ticks, which is also the time taken off per tick.
    pub tick_interval_ms: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            tick_interval_ms: 100,
        }
    }
}

/// Settings of the static file host that serves the clock page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            static_dir: PathBuf::from("./static"),
        }
    }
}

impl ServerConfig {
    pub const ADDR_VAR: &'static str = "CHESS_CLOCK_ADDR";
    pub const STATIC_DIR_VAR: &'static str = "CHESS_CLOCK_STATIC_DIR";

    /// Reads the settings from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ServerConfig::default();
        if let Some(addr) = lookup(Self::ADDR_VAR).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = addr.trim().to_string();
        }
        if let Some(dir) = lookup(Self::STATIC_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.static_dir = PathBuf::from(dir.trim());
        }
        config
    }
}
