//! Scene component data
//!
//! Plain data aggregates. Every entity always carries [`IdComponent`],
//! [`TagComponent`], [`TransformComponent`] and [`RelationshipComponent`];
//! everything else is optional.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use void_core::Uuid;
use void_physics::LayerCollisionMask;
use void_scripting::FieldBuffer;

// ============================================================================
// Identity and hierarchy
// ============================================================================

/// Durable identity, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdComponent {
    pub id: Uuid,
}

/// Display name, collision layer and enabled flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TagComponent {
    pub tag: String,
    /// Collision layer bit
    pub layer: u16,
    pub enabled: bool,
}

impl Default for TagComponent {
    fn default() -> Self {
        Self {
            tag: String::new(),
            layer: LayerCollisionMask::DEFAULT_LAYER,
            enabled: true,
        }
    }
}

impl TagComponent {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// Local transform relative to the parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TransformComponent {
    pub translation: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformComponent {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Rotation applying X first, then Y, then Z
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.rotation.z, self.rotation.y, self.rotation.x)
    }

    pub fn set_rotation_quat(&mut self, rotation: Quat) {
        let (z, y, x) = rotation.to_euler(EulerRot::ZYX);
        self.rotation = Vec3::new(x, y, z);
    }

    /// Local matrix, translation * rotation * scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.translation)
    }
}

/// Parent/child links by UUID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RelationshipComponent {
    /// `Uuid::NIL` for roots
    pub parent: Uuid,
    pub children: Vec<Uuid>,
}

impl RelationshipComponent {
    pub fn has_parent(&self) -> bool {
        !self.parent.is_nil()
    }
}

/// Marks the root of an instantiated prefab
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PrefabComponent {
    pub id: Uuid,
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpriteRendererComponent {
    pub color: Vec4,
    /// Texture asset path, `None` for a flat color quad
    pub texture: Option<String>,
    pub tiling_factor: f32,
    pub offset: Vec2,
    /// Lower orders are drawn first
    pub sorting_order: i32,
}

impl Default for SpriteRendererComponent {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            texture: None,
            tiling_factor: 1.0,
            offset: Vec2::ZERO,
            sorting_order: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MeshComponent {
    pub filepath: String,
    pub submesh_index: u32,
    pub cull_mode: CullMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SkyLightComponent {
    /// Environment map path
    pub texture: Option<String>,
    pub intensity: f32,
    /// Rotation around the up axis, radians
    pub rotation: f32,
}

impl Default for SkyLightComponent {
    fn default() -> Self {
        Self {
            texture: None,
            intensity: 0.7,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightType {
    Directional,
    #[default]
    Point,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadowQuality {
    Hard,
    Soft,
    #[default]
    UltraSoft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LightComponent {
    #[serde(rename = "Type")]
    pub light_type: LightType,
    pub use_color_temperature_mode: bool,
    /// Kelvin
    pub temperature: u16,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    /// Spot inner cone, degrees
    pub cut_off_angle: f32,
    /// Spot outer cone, degrees
    pub outer_cut_off_angle: f32,
    pub shadow_quality: ShadowQuality,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            use_color_temperature_mode: false,
            temperature: 6570,
            color: Vec3::ONE,
            intensity: 20.0,
            range: 1.0,
            cut_off_angle: 12.5,
            outer_cut_off_angle: 17.5,
            shadow_quality: ShadowQuality::UltraSoft,
        }
    }
}

// ============================================================================
// Audio (configuration only)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttenuationModel {
    None,
    #[default]
    Inverse,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AudioSourceComponent {
    pub filepath: String,
    pub volume_multiplier: f32,
    pub pitch_multiplier: f32,
    pub play_on_awake: bool,
    pub looping: bool,
    pub spatialization: bool,
    pub attenuation_model: AttenuationModel,
    pub roll_off: f32,
    pub min_gain: f32,
    pub max_gain: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians
    pub cone_inner_angle: f32,
    pub cone_outer_angle: f32,
    pub cone_outer_gain: f32,
    pub doppler_factor: f32,
}

impl Default for AudioSourceComponent {
    fn default() -> Self {
        Self {
            filepath: String::new(),
            volume_multiplier: 1.0,
            pitch_multiplier: 1.0,
            play_on_awake: true,
            looping: false,
            spatialization: false,
            attenuation_model: AttenuationModel::Inverse,
            roll_off: 1.0,
            min_gain: 0.0,
            max_gain: 1.0,
            min_distance: 0.3,
            max_distance: 1000.0,
            cone_inner_angle: 360f32.to_radians(),
            cone_outer_angle: 360f32.to_radians(),
            cone_outer_gain: 0.0,
            doppler_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AudioListenerComponent {
    pub active: bool,
    pub cone_inner_angle: f32,
    pub cone_outer_angle: f32,
    pub cone_outer_gain: f32,
}

impl Default for AudioListenerComponent {
    fn default() -> Self {
        Self {
            active: true,
            cone_inner_angle: 360f32.to_radians(),
            cone_outer_angle: 360f32.to_radians(),
            cone_outer_gain: 0.0,
        }
    }
}

// ============================================================================
// Scripting
// ============================================================================

/// One script class attached to an entity, with its editor-time fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScriptClassEntry {
    pub name: String,
    pub fields: FieldBuffer,
}

/// Managed script classes attached to an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptComponent {
    pub classes: Vec<ScriptClassEntry>,
}

impl ScriptComponent {
    pub fn new(class: impl Into<String>) -> Self {
        let mut component = Self::default();
        component.add_class(class);
        component
    }

    /// Attach a class; attaching the same class twice is a no-op
    pub fn add_class(&mut self, class: impl Into<String>) -> &mut ScriptClassEntry {
        let class = class.into();
        let index = match self.classes.iter().position(|c| c.name == class) {
            Some(index) => index,
            None => {
                self.classes.push(ScriptClassEntry {
                    name: class,
                    fields: FieldBuffer::new(),
                });
                self.classes.len() - 1
            }
        };
        &mut self.classes[index]
    }

    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c.name != class);
        self.classes.len() != before
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.name == class)
    }

    pub fn class(&self, class: &str) -> Option<&ScriptClassEntry> {
        self.classes.iter().find(|c| c.name == class)
    }

    pub fn class_mut(&mut self, class: &str) -> Option<&mut ScriptClassEntry> {
        self.classes.iter_mut().find(|c| c.name == class)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }
}
