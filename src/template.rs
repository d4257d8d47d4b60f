//! Declarative entity records and the registry they are looked up in.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use dungeon::Color;
use error::{GameError, GameResult};

const BUILTIN_TEMPLATES: &str = include_str!("../data/entities.json");

/// An entity definition. Everything numeric is optional; capability
/// modules fill in their own defaults for whatever is missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Template {
    pub name: String,
    #[serde(default = "default_character")]
    pub character: char,
    #[serde(default = "default_foreground")]
    pub foreground: Color,
    #[serde(default)]
    pub background: Color,
    #[serde(default)]
    pub max_hp: Option<i32>,
    #[serde(default)]
    pub attack_value: Option<i32>,
    #[serde(default)]
    pub defense_value: Option<i32>,
    #[serde(default)]
    pub sight_radius: Option<i32>,
    #[serde(default)]
    pub inventory_slots: Option<usize>,
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub max_fullness: Option<i32>,
    #[serde(default)]
    pub fullness: Option<i32>,
    #[serde(default)]
    pub fullness_depletion_rate: Option<i32>,
    #[serde(default)]
    pub corpse_drop_rate: Option<u32>,
    /// Capability module keys, applied in this order.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

fn default_character() -> char {
    ' '
}

fn default_foreground() -> Color {
    Color::White
}

impl Template {
    /// Bare template with only a name and glyph.
    pub fn new(name: impl Into<String>, character: char) -> Self {
        Self {
            name: name.into(),
            character,
            foreground: default_foreground(),
            background: Color::default(),
            max_hp: None,
            attack_value: None,
            defense_value: None,
            sight_radius: None,
            inventory_slots: None,
            speed: None,
            tasks: Vec::new(),
            max_fullness: None,
            fullness: None,
            fullness_depletion_rate: None,
            corpse_drop_rate: None,
            capabilities: Vec::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = names.into_iter().map(Into::into).collect();
        self
    }

    /// Whether entities built from this become beings.
    pub fn is_health_bearing(&self) -> bool {
        self.max_hp.is_some() || self.capabilities.iter().any(|c| c == "destructible")
    }
}

/// Templates keyed by identifier. Entries cannot be replaced once defined.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates shipped in `data/entities.json`.
    pub fn builtin() -> GameResult<Self> {
        Self::from_json(BUILTIN_TEMPLATES)
    }

    pub fn load(path: &Path) -> GameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a JSON object of `key -> template`.
    pub fn from_json(text: &str) -> GameResult<Self> {
        let mut raw: HashMap<String, Template> = serde_json::from_str(text)?;
        let mut registry = Self::new();
        let mut keys: Vec<_> = raw.keys().cloned().collect();
        keys.sort();
        for key in keys {
            if let Some(template) = raw.remove(&key) {
                registry.define(key, template)?;
            }
        }
        Ok(registry)
    }

    pub fn define(&mut self, key: impl Into<String>, template: Template) -> GameResult<()> {
        let key = key.into();
        if self.templates.contains_key(&key) {
            return Err(GameError::DuplicateTemplate(key));
        }
        if template.name.trim().is_empty() {
            return Err(GameError::InvalidTemplate {
                key,
                reason: "empty name".to_string(),
            });
        }
        if let Some(max_hp) = template.max_hp {
            if max_hp <= 0 {
                return Err(GameError::InvalidTemplate {
                    key,
                    reason: format!("max_hp must be positive, got {}", max_hp),
                });
            }
        }
        self.templates.insert(key, template);
        Ok(())
    }

    pub fn get(&self, key: &str) -> GameResult<&Template> {
        self.templates
            .get(key)
            .ok_or_else(|| GameError::UnknownTemplate(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_data_parses() {
        let registry = TemplateRegistry::builtin().unwrap();
        let bat = registry.get("bat").unwrap();
        assert_eq!(bat.character, 'B');
        assert_eq!(bat.speed, Some(2000));
        assert_eq!(
            bat.capabilities,
            vec!["task_actor", "attacker", "destructible", "corpse_dropper"]
        );
        assert!(registry.get("player").unwrap().is_health_bearing());
    }

    #[test]
    fn unknown_key_is_an_error() {
        let registry = TemplateRegistry::builtin().unwrap();
        assert!(matches!(
            registry.get("dragon"),
            Err(GameError::UnknownTemplate(k)) if k == "dragon"
        ));
    }

    #[test]
    fn templates_cannot_be_redefined() {
        let mut registry = TemplateRegistry::new();
        registry.define("rock", Template::new("rock", '*')).unwrap();
        let err = registry.define("rock", Template::new("boulder", 'O')).unwrap_err();
        assert!(matches!(err, GameError::DuplicateTemplate(_)));
        assert_eq!(registry.get("rock").unwrap().name, "rock");
    }

    #[test]
    fn rejects_unknown_fields_and_bad_colours() {
        assert!(TemplateRegistry::from_json(r#"{"x": {"name": "x", "hp": 3}}"#).is_err());
        let plaid = r#"{"x": {"name": "x", "foreground": "plaid"}}"#;
        assert!(TemplateRegistry::from_json(plaid).is_err());
    }

    #[test]
    fn rejects_non_positive_health() {
        let err = TemplateRegistry::from_json(r#"{"x": {"name": "x", "max_hp": 0}}"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidTemplate { .. }));
    }
}
