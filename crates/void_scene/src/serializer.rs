//! Entity and prefab documents
//!
//! An entity document is a JSON object with an `Entity` key holding the
//! UUID and one block per serializable component, keyed by the component
//! table name:
//!
//! ```json
//! {
//!   "Entity": 1234,
//!   "TagComponent": { "Tag": "Player", "Layer": 2, "Enabled": true },
//!   "RelationshipComponent": { "Parent": 0, "Children": [5678] }
//! }
//! ```
//!
//! A prefab wraps a subtree as `{ "Prefab": id, "Entities": [...] }`.
//!
//! Reading is permissive: missing keys take their defaults and malformed
//! keys are dropped with a warning instead of failing the load.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use void_core::Uuid;
use void_scripting::{FieldBuffer, FieldValue};

use crate::component_table::component_table;
use crate::components::{PrefabComponent, RelationshipComponent, ScriptClassEntry, ScriptComponent};
use crate::entity::Entity;
use crate::error::{Result, SceneError};
use crate::scene::DEFAULT_ENTITY_NAME;
use crate::Scene;

/// Read a component block, falling back to defaults key by key
pub(crate) fn read_permissive<T>(node: &Value) -> T
where
    T: Default + Serialize + DeserializeOwned,
{
    if let Ok(value) = T::deserialize(node) {
        return value;
    }

    let type_name = std::any::type_name::<T>();
    let Value::Object(fields) = node else {
        log::warn!("Expected an object for {}, using defaults", type_name);
        return T::default();
    };
    let Ok(mut merged) = serde_json::to_value(T::default()) else {
        return T::default();
    };

    for (key, value) in fields {
        let mut candidate = merged.clone();
        if let Value::Object(map) = &mut candidate {
            map.insert(key.clone(), value.clone());
        }
        if T::deserialize(&candidate).is_ok() {
            merged = candidate;
        } else {
            log::warn!("Ignoring malformed key '{}' of {}", key, type_name);
        }
    }
    T::deserialize(&merged).unwrap_or_default()
}

// ============================================================================
// Script component
// ============================================================================

/// `{ "Scripts": [{ "Name": ..., "Fields": {...} }] }`
///
/// With an engine attached only fields declared serializable are written.
pub(crate) fn serialize_script_component(scene: &Scene, entity: Entity) -> Result<Value> {
    let scripts = scene.get_component::<ScriptComponent>(entity);
    let engine = scene.script_engine().map(|engine| engine.lock());

    let mut classes = Vec::with_capacity(scripts.classes.len());
    for class in &scripts.classes {
        let mut entry = class.clone();
        if let Some(declared) = engine.as_ref().and_then(|engine| engine.class(&class.name)) {
            entry
                .fields
                .retain(|name, _| declared.field(name).is_some_and(|f| f.serializable));
        }
        classes.push(serde_json::to_value(&entry)?);
    }
    Ok(json!({ "Scripts": classes }))
}

/// Classes the loaded assemblies do not know are dropped with an error log
pub(crate) fn deserialize_script_component(
    scene: &mut Scene,
    entity: Entity,
    node: &Value,
) -> Result<()> {
    let mut component = ScriptComponent::default();
    {
        let engine = scene.script_engine().map(|engine| engine.lock());
        let scripts = node
            .get("Scripts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for script in scripts {
            let name = script.get("Name").and_then(Value::as_str).unwrap_or_default();
            if name.is_empty() {
                log::warn!("Skipping script entry without a name");
                continue;
            }
            if let Some(engine) = engine.as_ref() {
                if !engine.has_class(name) {
                    log::error!("Script class not found: {}", name);
                    continue;
                }
            }

            let mut fields = read_fields(name, script.get("Fields"));
            if let Some(engine) = engine.as_ref() {
                engine.sync_field_buffer(name, &mut fields);
            }
            let entry: &mut ScriptClassEntry = component.add_class(name);
            entry.fields = fields;
        }
    }
    scene.add_component(entity, component);
    Ok(())
}

fn read_fields(class: &str, node: Option<&Value>) -> FieldBuffer {
    let mut fields = FieldBuffer::new();
    let Some(Value::Object(map)) = node else {
        return fields;
    };
    for (name, value) in map {
        match FieldValue::deserialize(value) {
            Ok(value) => {
                fields.insert(name.clone(), value);
            }
            Err(e) => log::warn!("Dropping field {}.{}: {}", class, name, e),
        }
    }
    fields
}

// ============================================================================
// Entities and prefabs
// ============================================================================

/// Reads and writes entity and prefab documents
pub struct EntitySerializer;

impl EntitySerializer {
    /// Every serializable component of one entity
    pub fn serialize_entity(scene: &Scene, entity: Entity) -> Result<Value> {
        let mut node = Map::new();
        node.insert("Entity".into(), Value::from(scene.uuid(entity).as_u64()));
        for entry in component_table() {
            if let Some(block) = entry.serialize(scene, entity) {
                node.insert(entry.name.into(), block?);
            }
        }
        Ok(Value::Object(node))
    }

    /// Create an entity from a document
    ///
    /// With `preserve_uuid` the document's UUID is reused, otherwise a fresh
    /// one is generated and relationship references are left for the caller
    /// to remap. A malformed component block is skipped with a warning.
    pub fn deserialize_entity(node: &Value, scene: &mut Scene, preserve_uuid: bool) -> Result<Entity> {
        let uuid = Self::document_uuid(node)?;
        if preserve_uuid && scene.has_entity(uuid) {
            return Err(SceneError::InvalidDocument(format!(
                "entity {} already exists",
                uuid
            )));
        }

        let name = node
            .get("TagComponent")
            .and_then(|tag| tag.get("Tag"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ENTITY_NAME);
        let entity = if preserve_uuid {
            scene.create_entity_with_uuid(uuid, name)
        } else {
            scene.create_entity(name)
        };

        for entry in component_table() {
            let Some(block) = node.get(entry.name) else {
                continue;
            };
            if let Err(e) = entry.deserialize(scene, entity, block) {
                log::warn!("Skipping {} of entity {}: {}", entry.name, uuid, e);
            }
        }

        log::trace!("Deserialized entity '{}' ({})", name, scene.uuid(entity));
        Ok(entity)
    }

    /// The non-nil UUID stored under `Entity`
    pub(crate) fn document_uuid(node: &Value) -> Result<Uuid> {
        let bits = node
            .get("Entity")
            .and_then(Value::as_u64)
            .ok_or(SceneError::MissingKey("Entity"))?;
        if bits == 0 {
            return Err(SceneError::InvalidDocument("entity UUID is nil".into()));
        }
        Ok(Uuid::from_u64(bits))
    }

    /// Write an entity and all of its descendants as a prefab
    ///
    /// The root receives a [`PrefabComponent`] with a fresh id, which is
    /// also the document's `Prefab` key. Entities are written root first,
    /// then depth first in child order.
    pub fn serialize_entity_as_prefab(scene: &mut Scene, entity: Entity) -> Result<Value> {
        scene.assert_valid(entity);
        if scene.has_component::<PrefabComponent>(entity) {
            return Err(SceneError::AlreadyPrefab(scene.uuid(entity)));
        }

        let prefab_id = Uuid::new();
        scene.add_component(entity, PrefabComponent { id: prefab_id });

        let mut subtree = vec![entity];
        collect_descendants(scene, entity, &mut subtree);
        let entities = subtree
            .iter()
            .map(|&e| Self::serialize_entity(scene, e))
            .collect::<Result<Vec<_>>>()?;

        Ok(json!({
            "Prefab": prefab_id.as_u64(),
            "Entities": entities,
        }))
    }

    /// Instantiate a prefab document with fresh UUIDs
    ///
    /// Every entity is created first, then parent and child references are
    /// rewritten through the old to new UUID map. References to entities
    /// outside the document are dropped with a warning, so the new root has
    /// no parent. Joints connected inside the document follow the map too. The document is validated before anything is created.
    pub fn deserialize_entity_as_prefab(node: &Value, scene: &mut Scene) -> Result<Entity> {
        let prefab_id = node
            .get("Prefab")
            .and_then(Value::as_u64)
            .ok_or(SceneError::MissingKey("Prefab"))?;
        if prefab_id == 0 {
            return Err(SceneError::InvalidDocument("prefab id is nil".into()));
        }
        let nodes = node
            .get("Entities")
            .and_then(Value::as_array)
            .ok_or(SceneError::MissingKey("Entities"))?;
        if nodes.is_empty() {
            return Err(SceneError::InvalidDocument("prefab has no entities".into()));
        }
        let old_ids = nodes
            .iter()
            .map(Self::document_uuid)
            .collect::<Result<Vec<_>>>()?;

        let mut remap = HashMap::with_capacity(nodes.len());
        let mut created = Vec::with_capacity(nodes.len());
        for (old, entity_node) in old_ids.into_iter().zip(nodes) {
            let entity = Self::deserialize_entity(entity_node, scene, false)?;
            remap.insert(old, scene.uuid(entity));
            created.push(entity);
        }

        let root = created[0];
        scene.add_component(
            root,
            PrefabComponent {
                id: Uuid::from_u64(prefab_id),
            },
        );

        for &entity in &created {
            let relationship = scene.get_component_mut::<RelationshipComponent>(entity);
            if !relationship.parent.is_nil() {
                relationship.parent = match remap.get(&relationship.parent) {
                    Some(&parent) => parent,
                    None => {
                        log::warn!(
                            "Prefab {} references parent {} outside the document",
                            prefab_id,
                            relationship.parent
                        );
                        Uuid::NIL
                    }
                };
            }
            relationship.children = relationship
                .children
                .iter()
                .filter_map(|old| {
                    let new = remap.get(old).copied();
                    if new.is_none() {
                        log::warn!(
                            "Prefab {} references child {} outside the document",
                            prefab_id,
                            old
                        );
                    }
                    new
                })
                .collect();
            scene.remap_joints_2d(entity, &remap);
        }

        log::trace!(
            "Instantiated prefab {} with {} entities",
            prefab_id,
            created.len()
        );
        Ok(root)
    }

    pub fn save_prefab<P: AsRef<Path>>(scene: &mut Scene, entity: Entity, path: P) -> Result<()> {
        let document = Self::serialize_entity_as_prefab(scene, entity)?;
        std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }

    pub fn load_prefab<P: AsRef<Path>>(path: P, scene: &mut Scene) -> Result<Entity> {
        let content = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&content)?;
        Self::deserialize_entity_as_prefab(&document, scene)
    }
}

fn collect_descendants(scene: &Scene, entity: Entity, out: &mut Vec<Entity>) {
    for child in scene.children(entity) {
        out.push(child);
        collect_descendants(scene, child, out);
    }
}
