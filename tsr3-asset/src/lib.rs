pub mod descriptor;
pub mod export;
pub mod format;
pub mod material;
pub mod processor;
pub mod reader;

pub use descriptor::{DrawEntry, SceneDescriptor};
pub use export::{ExportLayout, ExportOptions, ExportReport, ExportedArray, convert, export_model};
pub use material::MaterialLibrary;
pub use processor::{ProcessedModel, process_obj};
