//! Runtime configuration
//!
//! `PlayerTuning` carries the engine constants. `AppConfig` adds what the
//! binary needs at startup, read from the command line and environment:
//!
//! - first positional argument or `SHORTREELS_CATALOG`: catalog JSON path
//! - `SHORTREELS_ORIGIN`: origin sent to embed players
//! - `SHORTREELS_BLOCK_AUTOPLAY`: `1` or `true` makes native clips refuse
//!   to start until the user presses play

use std::path::PathBuf;
use std::time::Duration;

const CATALOG_ENV: &str = "SHORTREELS_CATALOG";
const ORIGIN_ENV: &str = "SHORTREELS_ORIGIN";
const BLOCK_AUTOPLAY_ENV: &str = "SHORTREELS_BLOCK_AUTOPLAY";

/// Timing and threshold constants of the player engine
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerTuning {
    /// Delay between a close and the backend teardown
    pub close_grace: Duration,
    /// Embed time sampling interval
    pub embed_poll_interval: Duration,
    pub countdown_seconds: u32,
    /// Fraction of the viewport a drag must exceed to minimize
    pub drag_commit_ratio: f64,
    pub wheel_threshold: f64,
    pub swipe_threshold: f64,
    pub initial_reveal: usize,
    pub skip_seconds: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            close_grace: Duration::from_millis(220),
            embed_poll_interval: Duration::from_millis(500),
            countdown_seconds: 2,
            drag_commit_ratio: 0.22,
            wheel_threshold: 20.0,
            swipe_threshold: 50.0,
            initial_reveal: 2,
            skip_seconds: 10.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `None` uses the bundled catalog
    pub catalog_path: Option<PathBuf>,
    pub origin: String,
    pub block_autoplay: bool,
    pub tuning: PlayerTuning,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let arg = std::env::args().nth(1);
        let env_path = std::env::var(CATALOG_ENV).ok();
        let origin = std::env::var(ORIGIN_ENV).ok();
        let block_autoplay = std::env::var(BLOCK_AUTOPLAY_ENV).ok();
        Self::resolve(arg, env_path, origin, block_autoplay)
    }

    fn resolve(
        arg: Option<String>,
        env_path: Option<String>,
        origin: Option<String>,
        block_autoplay: Option<String>,
    ) -> Self {
        let catalog_path = arg
            .or(env_path)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        let origin = origin
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(default_origin);
        let block_autoplay = block_autoplay
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            catalog_path,
            origin,
            block_autoplay,
            tuning: PlayerTuning::default(),
        }
    }
}

fn default_origin() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "localhost".to_string());
    format!("http://{}", host)
}
