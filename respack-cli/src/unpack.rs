use std::{
    fs::{File, OpenOptions},
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use respack_core::{AssetPack, pack::PackEntry};

use crate::{ListCommand, UnpackCommand};

fn open_pack(input: &str, key: &str) -> anyhow::Result<AssetPack> {
    let file = File::open(input).context(format!("Input file `{}` not found.", input))?;
    let pack = AssetPack::new(Box::new(BufReader::new(file)), key, false)
        .with_context(|| format!("Failed to open pack `{}`", input))?;
    Ok(pack)
}

fn output_path<P: AsRef<Path>>(output: &Option<String>, input: P) -> PathBuf {
    if let Some(output) = &output {
        // specified output directory
        output.into()
    } else if let Some(parent) = input.as_ref().parent() {
        // relative to input directory
        let dir_name = input
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or("output".to_string());
        parent.join(dir_name)
    } else {
        // current directory
        ".".into()
    }
}

pub fn list(cmd: &ListCommand) -> anyhow::Result<()> {
    let pack = open_pack(&cmd.input, &cmd.key)?;
    let database = pack.asset_database();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(database)?);
        return Ok(());
    }

    for entry in database.entries() {
        println!(
            "{:<20} {:>10} {:>8} {}",
            entry.asset_type(),
            entry.size(),
            format!("{:?}", entry.compression()).to_lowercase(),
            entry.name()
        );
    }
    println!("{} assets", database.len());

    Ok(())
}

fn process_entry(
    pack: &AssetPack,
    entry: &PackEntry,
    output_path: &Path,
    bar: &ProgressBar,
    r#override: bool,
) -> anyhow::Result<()> {
    let mut data = pack.get_data(entry.name(), entry.asset_type(), true)?;

    // assets of different types may share a name
    let filepath = output_path.join(entry.asset_type().name()).join(entry.name());
    if let Some(filedir) = filepath.parent()
        && !filedir.exists()
    {
        std::fs::create_dir_all(filedir)?;
    }

    let mut file = if r#override {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&filepath)?
    } else {
        OpenOptions::new().create_new(true).write(true).open(&filepath)?
    };
    match &mut data {
        respack_core::ResourceData::Static(data) => std::io::copy(&mut data.bytes(), &mut file)?,
        respack_core::ResourceData::Stream(data) => std::io::copy(data, &mut file)?,
    };

    bar.inc(1);
    Ok(())
}

pub fn unpack_parallel(cmd: &UnpackCommand) -> anyhow::Result<()> {
    let pack = open_pack(&cmd.input, &cmd.key)?;
    let entries = pack.asset_database().entries();

    // output path
    let output_path = output_path(&cmd.output, &cmd.input);

    // extract files
    let bar = ProgressBar::new(entries.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar().template("{pos}/{len} files written {wide_bar} elapsed: {elapsed} eta: {eta}")?,
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.println(format!("Output directory: `{}`", output_path.display()));

    let errors = Mutex::new(Vec::new());
    entries.par_iter().try_for_each(|entry| -> anyhow::Result<()> {
        let result = process_entry(&pack, entry, &output_path, &bar, cmd.r#override);
        match result {
            Err(e) if cmd.ignore_error => {
                bar.println(format!("Error processing entry: {}\nEntry: {:?}", e, entry));
                errors.lock().push(e);
                Ok(())
            }
            result => result.with_context(|| format!("Failed to unpack `{}`", entry.name())),
        }
    })?;

    bar.finish();

    let errors = errors.into_inner();
    if !errors.is_empty() {
        println!("Done with {} errors", errors.len());
    } else {
        println!("Done.");
    }

    Ok(())
}
