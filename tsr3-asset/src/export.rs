use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;
use tsr3_core::{ConvertError, ConvertResult, IndexedArray};

use crate::descriptor::SceneDescriptor;
use crate::format::save_to_file;
use crate::processor::{ProcessedModel, process_obj};

pub const COLLISION_FILE: &str = "collision.ia3";
pub const DESCRIPTOR_EXTENSION: &str = "tmdl";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Receives `<stem>.tmdl` and the `<stem>/` data directory.
    pub export_dir: PathBuf,
    /// Encode material meshes on the rayon pool.
    pub parallel: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
            parallel: true,
        }
    }
}

/// Paths derived from the input file name and the export directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    pub source: PathBuf,
    pub source_dir: PathBuf,
    pub model_name: String,
    pub export_dir: PathBuf,
    pub data_dir: PathBuf,
    pub descriptor_path: PathBuf,
}

impl ExportLayout {
    pub fn new(source: &Path, options: &ExportOptions) -> ConvertResult<Self> {
        let model_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ConvertError::malformed(format!("\"{}\" has no file name", source.display()))
            })?;

        let absolute_source =
            std::path::absolute(source).map_err(|e| ConvertError::file_open(source, e))?;
        let source_dir = absolute_source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let export_dir = std::path::absolute(&options.export_dir)
            .map_err(|e| ConvertError::file_open(&options.export_dir, e))?;

        Ok(Self {
            source: source.to_path_buf(),
            source_dir,
            data_dir: export_dir.join(&model_name),
            descriptor_path: export_dir.join(format!("{model_name}.{DESCRIPTOR_EXTENSION}")),
            model_name,
            export_dir,
        })
    }

    pub fn mesh_path(&self, material: &str) -> PathBuf {
        self.data_dir.join(format!("{material}.ia8"))
    }

    pub fn collision_path(&self) -> PathBuf {
        self.data_dir.join(COLLISION_FILE)
    }
}

/// One written IA file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedArray {
    pub path: PathBuf,
    pub vertices: usize,
    pub indices: usize,
}

impl ExportedArray {
    fn write<const N: usize>(ia: &IndexedArray<N>, path: PathBuf) -> ConvertResult<Self> {
        save_to_file(ia, &path)?;
        info!(
            "Exported \"{}\": {} vertices, {} indices",
            path.display(),
            ia.vertex_count(),
            ia.index_count()
        );
        Ok(Self {
            path,
            vertices: ia.vertex_count(),
            indices: ia.index_count(),
        })
    }

    /// Average corners per vertex, 0 for an empty mesh.
    pub fn reuse_ratio(&self) -> f32 {
        if self.vertices == 0 {
            0.0
        } else {
            self.indices as f32 / self.vertices as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Material meshes in sorted material order.
    pub meshes: Vec<ExportedArray>,
    pub collision: ExportedArray,
    pub descriptor: PathBuf,
}

/// Writes every material mesh, the collision mesh and the merged descriptor.
pub fn export_model(
    model: &ProcessedModel,
    layout: &ExportLayout,
    options: &ExportOptions,
) -> ConvertResult<ExportReport> {
    fs::create_dir_all(&layout.data_dir).map_err(|e| ConvertError::file_open(&layout.data_dir, e))?;

    let materials: Vec<(&String, &IndexedArray<8>)> = model.materials.iter().collect();
    let write_material =
        |(name, ia): &(&String, &IndexedArray<8>)| ExportedArray::write(*ia, layout.mesh_path(name.as_str()));
    let meshes = if options.parallel {
        materials.par_iter().map(write_material).collect::<ConvertResult<Vec<_>>>()?
    } else {
        materials.iter().map(write_material).collect::<ConvertResult<Vec<_>>>()?
    };

    let collision = ExportedArray::write(&model.collision, layout.collision_path())?;

    let mut descriptor = SceneDescriptor::load_or_default(&layout.descriptor_path)?;
    descriptor.merge_model(&layout.model_name, &model.textures)?;
    descriptor.save(&layout.descriptor_path)?;
    info!("Wrote \"{}\"", layout.descriptor_path.display());

    Ok(ExportReport {
        meshes,
        collision,
        descriptor: layout.descriptor_path.clone(),
    })
}

/// Full pipeline: parse `source`, then export next to `options.export_dir`.
pub fn convert(source: &Path, options: &ExportOptions) -> ConvertResult<ExportReport> {
    let layout = ExportLayout::new(source, options)?;
    let model = process_obj(source)?;
    export_model(&model, &layout, options)
}
