//! Generation configuration
//!
//! Settings are stored as RON. Missing files and unreadable files fall back
//! to the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ecs::EnemyKind;
use crate::error::{ConfigError, GenerationError};
use crate::world::grid::checked_area;

/// Default config file name
pub const CONFIG_FILE: &str = "levelgen.ron";

/// Largest map accepted, in cells (4096 x 4096)
pub const MAX_MAP_AREA: usize = 4096 * 4096;

/// Tally bump per carve under [`FloorTally::Legacy`]
pub const LEGACY_CARVE_TALLY: usize = 3;

/// How carving counts toward the fill ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FloorTally {
    /// Every carve counts 3, however many cells were new
    #[default]
    Legacy,
    /// Every carve counts the cells that were not floor before
    Exact,
}

/// Everything that shapes a generated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub width: i32,
    pub height: i32,
    pub max_walkers: usize,
    /// Target tally / area ratio; must stay strictly below 1
    pub fill_percentage: f32,
    pub mutation_chance: f32,
    pub obstacle_density: f32,
    pub enemy_types: Vec<EnemyKind>,
    pub floor_tally: FloorTally,
    pub max_growth_steps: u64,
    pub max_spawn_attempts: usize,
    pub seed: Option<u64>,
    /// Viewer pause between steps
    pub step_delay_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 40,
            max_walkers: 10,
            fill_percentage: 0.6,
            mutation_chance: 0.5,
            obstacle_density: 1.0 / 30.0,
            enemy_types: vec![EnemyKind::Contact, EnemyKind::Ranged, EnemyKind::Splitter],
            floor_tally: FloorTally::Legacy,
            max_growth_steps: 200_000,
            max_spawn_attempts: 500,
            seed: None,
            step_delay_ms: 5,
        }
    }
}

impl GenerationConfig {
    /// Highest fill ratio the tally can ever reach. Walkers never leave
    /// the inner ring: exact counting never sees the last column and row,
    /// and legacy counting gets at most one carve per inner cell.
    pub fn reachable_fill(&self) -> f32 {
        let (w, h) = (self.width as f32, self.height as f32);
        let reachable = match self.floor_tally {
            FloorTally::Exact => (w - 1.0) * (h - 1.0),
            FloorTally::Legacy => 1.0 + LEGACY_CARVE_TALLY as f32 * (w - 2.0) * (h - 2.0),
        };
        reachable / (w * h)
    }

    /// Reject configs the generator cannot finish
    pub fn validate(&self) -> Result<(), GenerationError> {
        let invalid = |msg: String| Err(GenerationError::InvalidConfig(msg));

        if self.width < 3 || self.height < 3 {
            return invalid(format!(
                "map must be at least 3x3, got {}x{}",
                self.width, self.height
            ));
        }
        match checked_area(self.width, self.height) {
            Some(area) if area <= MAX_MAP_AREA => {}
            _ => {
                return invalid(format!(
                    "map {}x{} exceeds the {} cell limit",
                    self.width, self.height, MAX_MAP_AREA
                ))
            }
        }
        if self.max_walkers == 0 {
            return invalid("max_walkers must be at least 1".into());
        }
        if !(self.fill_percentage > 0.0 && self.fill_percentage < 1.0) {
            return invalid(format!(
                "fill_percentage must be in (0, 1), got {}",
                self.fill_percentage
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_chance) {
            return invalid(format!(
                "mutation_chance must be in [0, 1], got {}",
                self.mutation_chance
            ));
        }
        if !(0.0..=1.0).contains(&self.obstacle_density) {
            return invalid(format!(
                "obstacle_density must be in [0, 1], got {}",
                self.obstacle_density
            ));
        }
        if self.fill_percentage > self.reachable_fill() {
            return invalid(format!(
                "fill_percentage {} is unreachable with {:?} counting on a {}x{} map (max {:.3})",
                self.fill_percentage,
                self.floor_tally,
                self.width,
                self.height,
                self.reachable_fill()
            ));
        }
        Ok(())
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "walkergen", "Walkergen") {
        let mut path = proj_dirs.config_dir().to_path_buf();
        path.push(CONFIG_FILE);
        path
    } else {
        PathBuf::from(CONFIG_FILE)
    }
}

/// Load a config from a RON file
pub fn load_config(path: &Path) -> Result<GenerationConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a config, falling back to defaults if it is missing or broken
pub fn load_or_default(path: &Path) -> GenerationConfig {
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return GenerationConfig::default();
    }

    match load_config(path) {
        Ok(config) => {
            log::info!("Config loaded from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("{}, using defaults", e);
            GenerationConfig::default()
        }
    }
}

/// Write the default config as pretty RON for easy editing
pub fn export_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let pretty = ron::ser::PrettyConfig::default();
    let ron = ron::ser::to_string_pretty(&GenerationConfig::default(), pretty)?;
    fs::write(path, ron).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Default config written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GenerationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_full_fill() {
        let config = GenerationConfig {
            fill_percentage: 1.0,
            ..GenerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_tiny_map() {
        let config = GenerationConfig {
            width: 2,
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unreachable_exact_fill() {
        let config = GenerationConfig {
            width: 10,
            height: 10,
            fill_percentage: 0.85,
            floor_tally: FloorTally::Exact,
            ..GenerationConfig::default()
        };
        // (9 * 9) / 100 = 0.81
        assert!(config.validate().is_err());

        let legacy = GenerationConfig {
            floor_tally: FloorTally::Legacy,
            ..config
        };
        assert_eq!(legacy.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_oversized_map() {
        let overflowing = GenerationConfig {
            width: 70_000,
            height: 70_000,
            ..GenerationConfig::default()
        };
        assert!(matches!(overflowing.validate(), Err(GenerationError::InvalidConfig(_))));

        let too_big = GenerationConfig {
            width: 5_000,
            height: 5_000,
            ..GenerationConfig::default()
        };
        assert!(too_big.validate().is_err());

        let at_limit = GenerationConfig {
            width: 4096,
            height: 4096,
            ..GenerationConfig::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_unreachable_legacy_fill() {
        // one inner cell: 1 + 3 = 4 of 9
        let config = GenerationConfig {
            width: 3,
            height: 3,
            fill_percentage: 0.5,
            ..GenerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(GenerationError::InvalidConfig(_))));

        let reachable = GenerationConfig {
            fill_percentage: 0.4,
            ..config
        };
        assert_eq!(reachable.validate(), Ok(()));
    }

    #[test]
    fn test_export_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        export_default_config(&path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, GenerationConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "(width: 12, height: 9, enemy_types: [Boss])").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.width, 12);
        assert_eq!(config.height, 9);
        assert_eq!(config.enemy_types, vec![EnemyKind::Boss]);
        assert_eq!(config.max_walkers, 10);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "(width: ").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(load_or_default(&path), GenerationConfig::default());
    }
}
