//! Whole-scene documents
//!
//! A scene is saved as `{ "Scene": name, "Entities": [...] }` with its
//! [`SceneConfig`] in a TOML file of the same stem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::serializer::EntitySerializer;
use crate::Scene;

pub struct SceneSerializer;

impl SceneSerializer {
    pub fn serialize(scene: &Scene) -> Result<Value> {
        let entities = scene
            .entities()
            .into_iter()
            .map(|entity| EntitySerializer::serialize_entity(scene, entity))
            .collect::<Result<Vec<_>>>()?;
        Ok(json!({
            "Scene": scene.name(),
            "Entities": entities,
        }))
    }

    /// Add the document's entities to `scene`, keeping their UUIDs
    ///
    /// Every entity UUID is checked before the scene is touched, so a
    /// rejected document leaves the scene as it was.
    pub fn deserialize(scene: &mut Scene, document: &Value) -> Result<()> {
        let nodes = document
            .get("Entities")
            .and_then(Value::as_array)
            .ok_or(SceneError::MissingKey("Entities"))?;

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in nodes {
            let uuid = EntitySerializer::document_uuid(node)?;
            if !seen.insert(uuid) || scene.has_entity(uuid) {
                return Err(SceneError::InvalidDocument(format!(
                    "duplicate entity {}",
                    uuid
                )));
            }
        }

        if let Some(name) = document.get("Scene").and_then(Value::as_str) {
            scene.set_name(name);
        }
        for node in nodes {
            EntitySerializer::deserialize_entity(node, scene, true)?;
        }

        log::debug!(
            "Deserialized scene '{}' with {} entities",
            scene.name(),
            nodes.len()
        );
        Ok(())
    }

    /// Config file stored next to a scene document
    pub fn config_path(path: &Path) -> PathBuf {
        path.with_extension("toml")
    }

    pub fn save<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<()> {
        let path = path.as_ref();
        let document = Self::serialize(scene)?;
        std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
        scene.config().save(Self::config_path(path))?;
        log::info!("Saved scene '{}' to {}", scene.name(), path.display());
        Ok(())
    }

    /// Load a scene document and its config into `scene`
    ///
    /// A missing config file leaves the scene's settings unchanged. On error
    /// the scene is untouched.
    pub fn load<P: AsRef<Path>>(scene: &mut Scene, path: P) -> Result<()> {
        let path = path.as_ref();
        let document: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;

        let config_path = Self::config_path(path);
        let config = if config_path.exists() {
            Some(SceneConfig::load(&config_path)?)
        } else {
            None
        };

        Self::deserialize(scene, &document)?;
        if let Some(config) = config {
            scene.set_config(config);
        }
        log::info!("Loaded scene '{}' from {}", scene.name(), path.display());
        Ok(())
    }
}
