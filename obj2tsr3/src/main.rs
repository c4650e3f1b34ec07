use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tsr3_asset::{ExportLayout, ExportOptions, ExportedArray, export_model, process_obj};

/// OBJ to TSR3 files converter.
///
/// Writes one `<material>.ia8` per material and a `collision.ia3` into
/// `<export-dir>/<stem>/`, and merges `<export-dir>/<stem>.tmdl`.
#[derive(Parser, Debug)]
#[command(name = "obj2tsr3", version)]
struct Args {
    /// Source OBJ file
    #[arg(value_name = "OBJ")]
    input: PathBuf,

    /// Directory receiving the descriptor and the data directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    export_dir: PathBuf,

    /// Encode material meshes one after another
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("OBJ2TSR3 | OBJ to TSR3 Files Converter");
    println!("======================================");

    let options = ExportOptions {
        export_dir: args.export_dir,
        parallel: !args.sequential,
    };
    let layout = ExportLayout::new(&args.input, &options)?;

    dump_path("Source file:", &layout.source);
    dump_path("Source directory:", &layout.source_dir);
    dump_path("Export directory:", &layout.export_dir);
    dump_path("Data directory:", &layout.data_dir);
    println!();

    let start = std::time::Instant::now();
    let model = process_obj(&layout.source)?;
    println!(
        "Parsed {} materials in {:.2}s",
        model.materials.len(),
        start.elapsed().as_secs_f32()
    );

    println!("\nExporting...\n");
    let report = export_model(&model, &layout, &options)?;

    for mesh in &report.meshes {
        dump_path("Export:", &mesh.path);
        dump_counts(mesh);
    }
    dump_path("Collision:", &report.collision.path);
    dump_counts(&report.collision);
    dump_path("TMDL:", &report.descriptor);

    println!("\nCompleted in {:.2}s.", start.elapsed().as_secs_f32());
    Ok(())
}

fn dump_path(desc: &str, path: &Path) {
    println!("{:<20} \"{}\"", desc, path.display());
}

fn dump_counts(array: &ExportedArray) {
    println!(
        "{} vertices, {} indices (each vertex used {:.1} times in avg)\n",
        array.vertices,
        array.indices,
        array.reuse_ratio()
    );
}
