//! Application configuration for the demo.

use std::path::PathBuf;

/// Frames processed before the demo stops on its own.
const DEFAULT_MAX_FRAMES: usize = 90;
/// Snapshot written by the space bar.
const DEFAULT_SNAPSHOT: &str = "screenshot.png";
/// Recording toggled by the tab key.
const DEFAULT_VIDEO: &str = "screencast.avi";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration for the Cameo demo, read from `CAMEO_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Image file or directory of images to play. A test pattern when unset.
    pub input: Option<PathBuf>,
    /// Frame rate the source reports. 0 means unknown.
    pub fps: f64,
    pub max_frames: usize,
    pub snapshot_path: PathBuf,
    pub video_path: PathBuf,
    /// JSON curve preset. Portra when unset.
    pub preset: Option<PathBuf>,
    pub mirror: bool,
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Scripted key presses as `(frames shown, key code)`.
    pub keys: Vec<(usize, i32)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl AppConfig {
    /// Build from an environment lookup. Unparseable values fall back to
    /// their defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            input: var("CAMEO_INPUT").map(PathBuf::from),
            fps: var("CAMEO_FPS").and_then(|s| s.parse().ok()).unwrap_or(0.0),
            max_frames: var("CAMEO_FRAMES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_FRAMES),
            snapshot_path: var("CAMEO_SNAPSHOT").map_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT), PathBuf::from),
            video_path: var("CAMEO_VIDEO").map_or_else(|| PathBuf::from(DEFAULT_VIDEO), PathBuf::from),
            preset: var("CAMEO_PRESET").map(PathBuf::from),
            mirror: var("CAMEO_MIRROR").is_some_and(|s| matches!(s.as_str(), "1" | "true" | "yes")),
            log_level: var("CAMEO_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            keys: var("CAMEO_KEYS").map(|s| parse_keys(&s)).unwrap_or_default(),
        }
    }
}

/// Parse `"frame:code,frame:code"`. Malformed entries are skipped.
fn parse_keys(list: &str) -> Vec<(usize, i32)> {
    list.split(',')
        .filter_map(|entry| {
            let (frame, code) = entry.trim().split_once(':')?;
            Some((frame.trim().parse().ok()?, code.trim().parse().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.input, None);
        assert_eq!(config.fps, 0.0);
        assert_eq!(config.max_frames, 90);
        assert_eq!(config.snapshot_path, PathBuf::from("screenshot.png"));
        assert_eq!(config.video_path, PathBuf::from("screencast.avi"));
        assert!(!config.mirror);
        assert_eq!(config.log_level, "info");
        assert!(config.keys.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(|name| {
            match name {
                "CAMEO_INPUT" => Some("frames"),
                "CAMEO_FPS" => Some("29.97"),
                "CAMEO_FRAMES" => Some("not a number"),
                "CAMEO_MIRROR" => Some("true"),
                "CAMEO_KEYS" => Some("3:32, 10:9,bad,20:"),
                _ => None,
            }
            .map(str::to_string)
        });
        assert_eq!(config.input, Some(PathBuf::from("frames")));
        assert_eq!(config.fps, 29.97);
        assert_eq!(config.max_frames, 90);
        assert!(config.mirror);
        assert_eq!(config.keys, vec![(3, 32), (10, 9)]);
    }
}
