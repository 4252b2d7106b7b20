//! Scene configuration
//!
//! Physics settings and the layer table, stored as TOML next to the scene
//! document. Missing keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use void_physics::{LayerCollisionMask, PhysicsSettings};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub physics: PhysicsSettings,
    pub layers: LayerCollisionMask,
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SceneConfig = toml::from_str(content)?;
        config.physics.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = SceneConfig::from_toml_str(
            r#"
            [physics]
            gravity_2d = [0.0, -20.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.physics.gravity_2d, [0.0, -20.0]);
        assert_eq!(config.physics.velocity_iterations, 8);
        assert_eq!(config.layers, LayerCollisionMask::default());
    }

    #[test]
    fn test_invalid_timestep_rejected() {
        let result = SceneConfig::from_toml_str(
            r#"
            [physics]
            fixed_timestep = 0.0
            "#,
        );
        assert!(matches!(result, Err(SceneError::Physics(_))));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.toml");

        let mut config = SceneConfig::default();
        config.physics.velocity_iterations = 12;
        config.layers.set_layer(5, "Enemies", 0x0006).unwrap();
        config.save(&path).unwrap();

        assert_eq!(SceneConfig::load(&path).unwrap(), config);
    }
}
