//! Script field metadata and values

use std::collections::BTreeMap;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Declared type of a script field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Bool,
    Float,
    Double,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    String,
    Vector2,
    Vector3,
    Vector4,
    Color,
}

/// A typed field value
///
/// Serialized externally tagged, so a stored value remembers the type it was
/// written with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    Float(f32),
    Double(f64),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    String(String),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Color(Vec4),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::Double(_) => FieldType::Double,
            FieldValue::Byte(_) => FieldType::Byte,
            FieldValue::UByte(_) => FieldType::UByte,
            FieldValue::Short(_) => FieldType::Short,
            FieldValue::UShort(_) => FieldType::UShort,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::UInt(_) => FieldType::UInt,
            FieldValue::Long(_) => FieldType::Long,
            FieldValue::ULong(_) => FieldType::ULong,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Vector2(_) => FieldType::Vector2,
            FieldValue::Vector3(_) => FieldType::Vector3,
            FieldValue::Vector4(_) => FieldType::Vector4,
            FieldValue::Color(_) => FieldType::Color,
        }
    }

    /// Zero value of a type
    pub fn default_for(ty: FieldType) -> Self {
        match ty {
            FieldType::Bool => FieldValue::Bool(false),
            FieldType::Float => FieldValue::Float(0.0),
            FieldType::Double => FieldValue::Double(0.0),
            FieldType::Byte => FieldValue::Byte(0),
            FieldType::UByte => FieldValue::UByte(0),
            FieldType::Short => FieldValue::Short(0),
            FieldType::UShort => FieldValue::UShort(0),
            FieldType::Int => FieldValue::Int(0),
            FieldType::UInt => FieldValue::UInt(0),
            FieldType::Long => FieldValue::Long(0),
            FieldType::ULong => FieldValue::ULong(0),
            FieldType::String => FieldValue::String(String::new()),
            FieldType::Vector2 => FieldValue::Vector2(Vec2::ZERO),
            FieldType::Vector3 => FieldValue::Vector3(Vec3::ZERO),
            FieldType::Vector4 => FieldValue::Vector4(Vec4::ZERO),
            FieldType::Color => FieldValue::Color(Vec4::ONE),
        }
    }

    /// Text form used by string field access
    pub fn to_field_string(&self) -> String {
        match self {
            FieldValue::Bool(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Double(v) => v.to_string(),
            FieldValue::Byte(v) => v.to_string(),
            FieldValue::UByte(v) => v.to_string(),
            FieldValue::Short(v) => v.to_string(),
            FieldValue::UShort(v) => v.to_string(),
            FieldValue::Int(v) => v.to_string(),
            FieldValue::UInt(v) => v.to_string(),
            FieldValue::Long(v) => v.to_string(),
            FieldValue::ULong(v) => v.to_string(),
            FieldValue::String(v) => v.clone(),
            FieldValue::Vector2(v) => format!("{} {}", v.x, v.y),
            FieldValue::Vector3(v) => format!("{} {} {}", v.x, v.y, v.z),
            FieldValue::Vector4(v) | FieldValue::Color(v) => {
                format!("{} {} {} {}", v.x, v.y, v.z, v.w)
            }
        }
    }

    /// Parse text into a value of the given type
    ///
    /// Vectors are whitespace separated components.
    pub fn parse(ty: FieldType, text: &str) -> Option<Self> {
        let text = text.trim();
        let floats = |n: usize| -> Option<Vec<f32>> {
            let parts: Vec<f32> = text
                .split_whitespace()
                .map(|p| p.parse().ok())
                .collect::<Option<_>>()?;
            (parts.len() == n).then_some(parts)
        };
        Some(match ty {
            FieldType::Bool => FieldValue::Bool(text.parse().ok()?),
            FieldType::Float => FieldValue::Float(text.parse().ok()?),
            FieldType::Double => FieldValue::Double(text.parse().ok()?),
            FieldType::Byte => FieldValue::Byte(text.parse().ok()?),
            FieldType::UByte => FieldValue::UByte(text.parse().ok()?),
            FieldType::Short => FieldValue::Short(text.parse().ok()?),
            FieldType::UShort => FieldValue::UShort(text.parse().ok()?),
            FieldType::Int => FieldValue::Int(text.parse().ok()?),
            FieldType::UInt => FieldValue::UInt(text.parse().ok()?),
            FieldType::Long => FieldValue::Long(text.parse().ok()?),
            FieldType::ULong => FieldValue::ULong(text.parse().ok()?),
            FieldType::String => FieldValue::String(text.to_string()),
            FieldType::Vector2 => {
                let v = floats(2)?;
                FieldValue::Vector2(Vec2::new(v[0], v[1]))
            }
            FieldType::Vector3 => {
                let v = floats(3)?;
                FieldValue::Vector3(Vec3::new(v[0], v[1], v[2]))
            }
            FieldType::Vector4 => FieldValue::Vector4(Vec4::from_slice(&floats(4)?)),
            FieldType::Color => FieldValue::Color(Vec4::from_slice(&floats(4)?)),
        })
    }
}

/// Editor-time field values for one script class on one entity
pub type FieldBuffer = BTreeMap<String, FieldValue>;

/// A field declared by a script class
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptField {
    pub name: String,
    pub ty: FieldType,
    pub default: FieldValue,
    /// Written to scene and prefab documents
    pub serializable: bool,
    /// Not shown in editor inspectors
    pub hidden: bool,
}

impl ScriptField {
    pub fn new(name: impl Into<String>, default: FieldValue) -> Self {
        Self {
            name: name.into(),
            ty: default.field_type(),
            default,
            serializable: true,
            hidden: false,
        }
    }

    pub fn non_serialized(mut self) -> Self {
        self.serializable = false;
        self
    }
}

/// Metadata for a class exported by a loaded assembly
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptClass {
    /// Fully qualified name, e.g. `Game.Player`
    pub name: String,
    pub fields: BTreeMap<String, ScriptField>,
}

impl ScriptClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: ScriptField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&ScriptField> {
        self.fields.get(name)
    }
}
