//! Game settings, read from an optional JSON file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use combat::RetaliationPolicy;
use error::{GameError, GameResult};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Level size in cells.
    pub width: i32,
    pub height: i32,
    /// Number of depths.
    pub depth: i32,
    /// RNG seed; absent means a fresh seed per run.
    pub seed: Option<u64>,
    pub monsters_per_level: usize,
    /// Template keys monsters are drawn from.
    pub monster_templates: Vec<String>,
    pub retaliation: RetaliationPolicy,
    /// Template file replacing the built-in set.
    pub templates: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            depth: 3,
            seed: None,
            monsters_per_level: 6,
            monster_templates: vec!["bat".into(), "newt".into(), "kobold".into()],
            retaliation: RetaliationPolicy::default(),
            templates: None,
            log_file: PathBuf::from("terminal_crawler.log"),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> GameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)
            .map_err(|e| GameError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(GameError::Config(format!(
                "level must be at least 3x3, got {}x{}",
                self.width, self.height
            )));
        }
        if self.depth < 1 {
            return Err(GameError::Config("depth must be at least 1".to_string()));
        }
        Ok(())
    }
}
