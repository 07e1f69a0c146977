use std::{
    fs::OpenOptions,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use indexmap::IndexSet;
use respack_core::{
    ImportAssetType, Metadata,
    write::{FileOptions, PackWriter},
};

use crate::PackCommand;

pub fn package(cmd: &PackCommand) -> anyhow::Result<()> {
    let input_dir = Path::new(&cmd.input);
    let input_paths = collect_inputs(input_dir)?;
    if input_paths.is_empty() {
        anyhow::bail!("No input files found");
    }

    // create output writer
    let output_path = cmd
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| input_dir.with_extension("dat"));
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut output_option = OpenOptions::new();
    if cmd.r#override {
        output_option.create(true).truncate(true);
    } else {
        output_option.create_new(true);
    }
    output_option.write(true);
    let output_file = output_option
        .open(&output_path)
        .with_context(|| format!("Failed to create output file `{}`", output_path.display()))?;

    // package files
    let mut writer = PackWriter::new(BufWriter::new(output_file)).encryption_key(&cmd.key);
    let mut packed = 0;
    for input_path in input_paths {
        let name = asset_name(input_dir, &input_path);
        let extension = input_path.extension().map(|e| e.to_string_lossy()).unwrap_or_default();
        let importer = ImportAssetType::from_extension(&extension);
        let Some(asset_type) = importer.output_type() else {
            log::info!("Skipping `{}` ({})", name, importer);
            continue;
        };

        log::info!("Packing {}: {}", asset_type, name);
        let data = std::fs::read(&input_path).with_context(|| format!("Failed to read `{}`", input_path.display()))?;
        let mut meta = Metadata::new();
        meta.set("importer", importer);
        let options = FileOptions::default().compression(cmd.compression).meta(meta);
        writer.add_asset(&name, asset_type, options, &data)?;
        packed += 1;
    }
    writer.finish()?;

    println!("Packed {} assets into {}", packed, output_path.display());
    println!("Done!");

    Ok(())
}

/// Asset name of a file: its path relative to the input directory, with forward slashes.
fn asset_name(input_dir: &Path, path: &Path) -> String {
    path.strip_prefix(input_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Collect input files in input directory into a single list of files.
fn collect_inputs(input_dir: impl AsRef<Path>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = IndexSet::new();

    let input_dir = input_dir.as_ref();
    if !input_dir.exists() {
        anyhow::bail!("Input directory does not exist: {}", input_dir.display());
    }

    for entry in walkdir::WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry?;
        if entry.path().is_file() {
            files.insert(entry.into_path());
        }
    }

    Ok(files.into_iter().collect())
}
