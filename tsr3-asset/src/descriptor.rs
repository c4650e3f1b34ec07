//! `.tmdl` scene descriptor.
//!
//! The descriptor is a JSON object. Regeneration only overwrites the `draw`
//! entries it produces; `name`, `collision` and `mass` are filled in when
//! absent and every other field is carried over untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tsr3_core::{ConvertError, ConvertResult};

use crate::material::MaterialLibrary;

pub const DEFAULT_MASS: f64 = 0.0;

/// What the renderer needs to draw one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawEntry {
    pub mesh: String,
    pub texture: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescriptor {
    root: Map<String, Value>,
}

impl SceneDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> ConvertResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        match serde_json::from_str(text) {
            Ok(Value::Object(root)) => Ok(Self { root }),
            Ok(_) => Err(ConvertError::Descriptor("top level is not an object".into())),
            Err(e) => Err(ConvertError::Descriptor(e.to_string())),
        }
    }

    /// Reads `path` if it is an existing file, otherwise starts empty.
    pub fn load_or_default(path: &Path) -> ConvertResult<Self> {
        if !path.is_file() {
            return Ok(Self::new());
        }
        let text = fs::read_to_string(path).map_err(|e| ConvertError::file_open(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Sets `key` only when it is missing. Returns whether it was set.
    pub fn set_if_absent(&mut self, key: &str, value: impl Into<Value>) -> bool {
        if self.root.contains_key(key) {
            return false;
        }
        self.root.insert(key.to_string(), value.into());
        true
    }

    /// Writes `mesh` and `texture` of `draw[material]`, keeping any other
    /// fields of that entry.
    pub fn set_draw(&mut self, material: &str, entry: &DrawEntry) -> ConvertResult<()> {
        let draw = object_slot(&mut self.root, "draw")?;
        let target = object_slot(draw, material)?;
        let Value::Object(fields) =
            serde_json::to_value(entry).map_err(|e| ConvertError::Descriptor(e.to_string()))?
        else {
            return Err(ConvertError::Descriptor("draw entry is not an object".into()));
        };
        target.extend(fields);
        Ok(())
    }

    pub fn draw_entry(&self, material: &str) -> Option<DrawEntry> {
        let value = self.root.get("draw")?.get(material)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Merges the outputs of converting `model_name` into the descriptor.
    pub fn merge_model(&mut self, model_name: &str, textures: &MaterialLibrary) -> ConvertResult<()> {
        object_slot(&mut self.root, "draw")?;
        for (material, texture) in textures.iter() {
            let entry = DrawEntry {
                mesh: mesh_reference(model_name, material),
                texture: normalize_texture_path(texture),
            };
            self.set_draw(material, &entry)?;
        }

        self.set_if_absent("name", model_name);
        self.set_if_absent("collision", collision_reference(model_name));
        self.set_if_absent("mass", DEFAULT_MASS);
        Ok(())
    }

    /// Pretty JSON with 4-space indentation and sorted keys.
    pub fn to_pretty_string(&self) -> ConvertResult<String> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.root
            .serialize(&mut ser)
            .map_err(|e| ConvertError::Descriptor(e.to_string()))?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| ConvertError::Descriptor(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> ConvertResult<()> {
        let text = self.to_pretty_string()?;
        fs::write(path, text).map_err(|e| ConvertError::file_open(path, e))
    }
}

/// `map[key]` as an object, created when missing or null.
fn object_slot<'a>(map: &'a mut Map<String, Value>, key: &str) -> ConvertResult<&'a mut Map<String, Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => Ok(inner),
        _ => Err(ConvertError::Descriptor(format!("\"{key}\" is not an object"))),
    }
}

/// Rewrites every `\\` pair in a texture path to `/`.
pub fn normalize_texture_path(raw: &str) -> String {
    raw.replace("\\\\", "/")
}

pub fn mesh_reference(model_name: &str, material: &str) -> String {
    format!("{model_name}/{material}.ia8")
}

pub fn collision_reference(model_name: &str) -> String {
    format!("{model_name}/collision.ia3")
}
