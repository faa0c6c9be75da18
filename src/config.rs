// Runtime configuration: generator tunables plus server/pointer settings.

use std::env;
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};
use crate::geometry::Point;

pub const ENV_LOG_LEVEL: &str = "PAINT_PATHS_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "PAINT_PATHS_LOG_FILE";
pub const ENV_CONFIG: &str = "PAINT_PATHS_CONFIG";
pub const ENV_SEED: &str = "PAINT_PATHS_SEED";
pub const ENV_MOVE_INTERVAL_MS: &str = "PAINT_PATHS_MOVE_INTERVAL_MS";
pub const ENV_ORIGIN: &str = "PAINT_PATHS_ORIGIN";

const DEFAULT_LOG_FILE_NAME: &str = "paint_path_generator.log";
const DEFAULT_MOVE_INTERVAL_MS: u64 = 5;
const DEFAULT_MAX_POINTS: usize = 10_000;

/// Tunable parameters of the path generator.
///
/// Any field missing from a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Sampling step for circles and hearts, in degrees.
    pub angular_step_degrees: f64,
    /// Sampling step for spirals, in degrees.
    pub spiral_step_degrees: f64,
    /// Star inner radius as a fraction of the outer radius.
    pub star_inner_ratio: f64,
    pub spiral_turns: u32,
    pub zigzag_peaks: u32,
    /// Horizontal sampling step of a wave, in pixels.
    pub wave_step: f64,
    /// Wave angular frequency, in radians per pixel.
    pub wave_frequency: f64,
    pub scribble_steps: u32,
    /// Largest per-axis offset of one scribble step.
    pub scribble_max_delta: i32,
    pub dot_columns: u32,
    pub dot_rows: u32,
    /// Largest number of points a single path or dot grid may hold.
    pub max_points: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            angular_step_degrees: 10.0,
            spiral_step_degrees: 15.0,
            star_inner_ratio: 0.5,
            spiral_turns: 2,
            zigzag_peaks: 5,
            wave_step: 5.0,
            wave_frequency: 0.1,
            scribble_steps: 15,
            scribble_max_delta: 30,
            dot_columns: 7,
            dot_rows: 5,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, step) in [
            ("angular_step_degrees", self.angular_step_degrees),
            ("spiral_step_degrees", self.spiral_step_degrees),
        ] {
            if !step.is_finite() || step <= 0.0 || step > 120.0 {
                return Err(PathError::invalid(format!(
                    "{} must be in (0, 120], got {}",
                    name, step
                )));
            }
        }
        for (name, value) in [
            ("star_inner_ratio", self.star_inner_ratio),
            ("wave_step", self.wave_step),
            ("wave_frequency", self.wave_frequency),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PathError::invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        for (name, count) in [
            ("spiral_turns", self.spiral_turns),
            ("zigzag_peaks", self.zigzag_peaks),
            ("scribble_steps", self.scribble_steps),
            ("dot_columns", self.dot_columns),
            ("dot_rows", self.dot_rows),
        ] {
            if count == 0 {
                return Err(PathError::invalid(format!("{} must be positive", name)));
            }
        }
        if self.scribble_max_delta <= 0 {
            return Err(PathError::invalid(format!(
                "scribble_max_delta must be positive, got {}",
                self.scribble_max_delta
            )));
        }
        if self.max_points < 2 {
            return Err(PathError::invalid(format!(
                "max_points must be at least 2, got {}",
                self.max_points
            )));
        }
        Ok(())
    }

    /// Loads and validates a JSON config file.
    pub fn from_file(path: &FsPath) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| PathError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: GeneratorConfig = serde_json::from_str(&text)
            .map_err(|e| PathError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// Settings of the stdio server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    pub generator: GeneratorConfig,
    /// Fixed scribble seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Pause after each pointer move.
    pub move_interval: Duration,
    /// Screen position of canvas coordinate (0, 0).
    pub origin: Point,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            log_level: LevelFilter::Info,
            log_file: env::temp_dir().join(DEFAULT_LOG_FILE_NAME),
            generator: GeneratorConfig::default(),
            seed: None,
            move_interval: Duration::from_millis(DEFAULT_MOVE_INTERVAL_MS),
            origin: Point::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from a key lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level.parse().map_err(|_| {
                PathError::Config(format!("{}: unknown log level '{}'", ENV_LOG_LEVEL, level))
            })?;
        }
        if let Some(file) = get(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(file);
        }
        if let Some(path) = get(ENV_CONFIG) {
            debug!("Loading generator config from {}", path);
            config.generator = GeneratorConfig::from_file(FsPath::new(&path))?;
        }
        if let Some(seed) = get(ENV_SEED) {
            config.seed = Some(seed.parse().map_err(|_| {
                PathError::Config(format!("{}: '{}' is not a u64", ENV_SEED, seed))
            })?);
        }
        if let Some(ms) = get(ENV_MOVE_INTERVAL_MS) {
            let ms: u64 = ms.parse().map_err(|_| {
                PathError::Config(format!(
                    "{}: '{}' is not a number of milliseconds",
                    ENV_MOVE_INTERVAL_MS, ms
                ))
            })?;
            config.move_interval = Duration::from_millis(ms);
        }
        if let Some(origin) = get(ENV_ORIGIN) {
            config.origin = parse_origin(&origin)?;
        }

        Ok(config)
    }
}

fn parse_origin(value: &str) -> Result<Point> {
    let bad = || PathError::Config(format!("{}: expected 'x,y', got '{}'", ENV_ORIGIN, value));
    let (x, y) = value.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"angular_step_degrees": 15.0}"#).unwrap();
        assert_eq!(config.angular_step_degrees, 15.0);
        assert_eq!(config.star_inner_ratio, 0.5);
        assert_eq!(config.zigzag_peaks, 5);
        assert_eq!(config.max_points, 10_000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GeneratorConfig::default();
        config.angular_step_degrees = 0.0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.zigzag_peaks = 0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.star_inner_ratio = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.max_points = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_config_from_lookup() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_LOG_LEVEL, "debug"),
            (ENV_SEED, "1234"),
            (ENV_MOVE_INTERVAL_MS, "20"),
            (ENV_ORIGIN, " 100, 250 "),
        ]))
        .unwrap();

        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.move_interval, Duration::from_millis(20));
        assert_eq!(config.origin, Point::new(100, 250));
    }

    #[test]
    fn test_server_config_empty_env_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[(ENV_SEED, "  ")])).unwrap();
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.seed, None);
        assert_eq!(config.origin, Point::new(0, 0));
    }

    #[test]
    fn test_server_config_rejects_garbage() {
        assert!(ServerConfig::from_lookup(lookup(&[(ENV_SEED, "abc")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[(ENV_ORIGIN, "12")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = env::temp_dir()
            .join(format!("paint_paths_config_test_{}.json", std::process::id()));
        fs::write(&path, r#"{"spiral_turns": 3, "wave_step": 2.5}"#).unwrap();
        let config = GeneratorConfig::from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.spiral_turns, 3);
        assert_eq!(config.wave_step, 2.5);
    }

    #[test]
    fn test_missing_config_file() {
        let err = GeneratorConfig::from_file(FsPath::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.code(), 1017);
    }
}
