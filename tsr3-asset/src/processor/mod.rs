pub mod builder;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use tsr3_core::{ConvertError, ConvertResult, IndexedArray};

pub use builder::{AssembledMesh, MeshAssembler};

use crate::material::MaterialLibrary;
use crate::reader::{parse_face, parse_str, parse_vector};

/// Result of one parse pass over an OBJ file.
#[derive(Debug, Default)]
pub struct ProcessedModel {
    /// Render arrays keyed by material name, in sorted order.
    pub materials: BTreeMap<String, IndexedArray<8>>,
    /// Position-only mesh over every face of every material.
    pub collision: IndexedArray<3>,
    pub textures: MaterialLibrary,
}

pub fn process_obj(path: &Path) -> ConvertResult<ProcessedModel> {
    let bytes = fs::read(path).map_err(|e| ConvertError::file_open(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    process_obj_source(&text, path, base_dir)
}

/// Parses OBJ text. `origin` names the source in errors, `base_dir` anchors
/// relative `mtllib` paths.
pub fn process_obj_source(text: &str, origin: &Path, base_dir: &Path) -> ConvertResult<ProcessedModel> {
    let mut assembler = MeshAssembler::new();
    let mut textures = MaterialLibrary::new();

    parse_str(text, origin, |line| {
        match line.keyword {
            "mtllib" => {
                let mtl_path = base_dir.join(line.rest);
                info!("MtlLib \"{}\"", mtl_path.display());
                textures.load_into(&mtl_path)?;
            }
            "usemtl" => assembler.select_material(line.rest),
            "v" => assembler.push_position(parse_vector(line.rest)?),
            "vt" => assembler.push_uv(parse_vector(line.rest)?),
            "vn" => assembler.push_normal(parse_vector(line.rest)?),
            "f" => assembler.push_face(&parse_face(line.rest)?)?,
            _ => {}
        }
        Ok(())
    })?;

    debug!(
        "Read {} positions, {} uvs, {} normals",
        assembler.position_count(),
        assembler.uv_count(),
        assembler.normal_count()
    );

    let AssembledMesh { materials, collision } = assembler.finish();
    Ok(ProcessedModel {
        materials,
        collision,
        textures,
    })
}
