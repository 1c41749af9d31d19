//! Sandbox configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Sandbox run configuration.
///
/// Automaton tuning lives in [`automaton::AutomatonConfig`]; this only
/// covers how the sandbox itself runs.
#[derive(Clone, Debug)]
pub struct SandboxConfig {
    /// RON scenario to load instead of the built-in cave.
    pub scenario: Option<PathBuf>,
    /// Stop after the host has consumed this many keys.
    pub max_keys: usize,
    /// Draw the map after every command and accept keyboard interrupts.
    pub render: bool,
    /// Delay between turns while rendering.
    pub frame_delay: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            max_keys: 5000,
            render: false,
            frame_delay: Duration::from_millis(60),
        }
    }
}

impl SandboxConfig {
    /// Construct sandbox configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SANDBOX_SCENARIO` - Path to a RON scenario file (default: built-in cave)
    /// - `SANDBOX_MAX_KEYS` - Key budget before the run is cut short (default: 5000)
    /// - `SANDBOX_RENDER` - Draw the map in the terminal (default: false)
    /// - `SANDBOX_FRAME_DELAY_MS` - Pause between rendered turns (default: 60)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.scenario = env::var_os("SANDBOX_SCENARIO").map(PathBuf::from);

        if let Some(max_keys) = read_env::<usize>("SANDBOX_MAX_KEYS") {
            config.max_keys = max_keys.max(1);
        }

        if let Some(render) = read_env::<bool>("SANDBOX_RENDER") {
            config.render = render;
        }

        if let Some(delay) = read_env::<u64>("SANDBOX_FRAME_DELAY_MS") {
            config.frame_delay = Duration::from_millis(delay);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
