use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use tsr3_core::ConvertResult;

use crate::reader::parse_file;

/// Material name to diffuse texture path, as declared by `newmtl`/`map_Kd`.
///
/// Independent of which materials the mesh actually uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialLibrary {
    textures: BTreeMap<String, String>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> ConvertResult<Self> {
        let mut library = Self::new();
        library.load_into(path)?;
        Ok(library)
    }

    /// Reads another material library, adding to (or replacing) known entries.
    pub fn load_into(&mut self, path: &Path) -> ConvertResult<()> {
        let mut current: Option<String> = None;
        parse_file(path, |line| {
            match line.keyword {
                "newmtl" => current = Some(line.rest.to_string()),
                "map_Kd" => match &current {
                    Some(name) => {
                        debug!("Material \"{}\" uses texture \"{}\"", name, line.rest);
                        self.textures.insert(name.clone(), line.rest.to_string());
                    }
                    None => warn!(
                        "{}:{}: map_Kd outside of any newmtl block, ignored",
                        path.display(),
                        line.number
                    ),
                },
                _ => {}
            }
            Ok(())
        })
    }

    pub fn insert(&mut self, material: impl Into<String>, texture: impl Into<String>) {
        self.textures.insert(material.into(), texture.into());
    }

    pub fn texture(&self, material: &str) -> Option<&str> {
        self.textures.get(material).map(String::as_str)
    }

    /// Entries in sorted material order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.textures.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_textures_per_material() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scene.mtl");
        fs::write(
            &path,
            "# Blender MTL\nmap_Kd orphan.png\nnewmtl Stone\nKd 0.8 0.8 0.8\nmap_Kd textures\\\\stone.png\n\n\
             newmtl Glass\nd 0.2\nnewmtl Wood\nmap_Kd wood old.png\nmap_Kd wood.png\n",
        )
        .expect("write mtl");

        let library = MaterialLibrary::load(&path).expect("load mtl");
        assert_eq!(library.len(), 2);
        assert_eq!(library.texture("Stone"), Some("textures\\\\stone.png"));
        assert_eq!(library.texture("Wood"), Some("wood.png"));
        assert_eq!(library.texture("Glass"), None);
        assert_eq!(library.texture(""), None);
    }

    #[test]
    fn load_into_merges_libraries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("a.mtl");
        let b = dir.path().join("b.mtl");
        fs::write(&a, "newmtl Shared\nmap_Kd a.png\nnewmtl OnlyA\nmap_Kd only_a.png\n").expect("write a");
        fs::write(&b, "newmtl Shared\nmap_Kd b.png\n").expect("write b");

        let mut library = MaterialLibrary::new();
        library.load_into(&a).expect("load a");
        library.load_into(&b).expect("load b");

        let entries: Vec<_> = library.iter().collect();
        assert_eq!(entries, vec![("OnlyA", "only_a.png"), ("Shared", "b.png")]);
    }
}
