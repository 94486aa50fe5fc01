use anyhow::{Context, Result};
use instaddp::{annotations::is_image, archive::DdpArchive, registry::REGISTRY};
use std::{env, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to a data download zip.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <DDP_ZIP>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print the classification, every entry, and which dataset each JSON entry feeds.
fn inspect(path: &Path) -> Result<()> {
    let archive = DdpArchive::open_path(path).with_context(|| format!("opening {:?}", path))?;

    println!("=== DDP: {} ===", path.display());
    println!("Classification: {}", archive.classify().as_str());
    println!("Entries:        {}", archive.len());
    println!();

    // A dataset only ever reads the first entry its pattern matches.
    let resolved: Vec<(usize, &str)> = REGISTRY
        .iter()
        .filter_map(|d| archive.find_json(d.locate_pattern).map(|i| (i, d.name)))
        .collect();

    for (i, name) in archive.entry_names().iter().enumerate() {
        let feeds: Vec<&str> = resolved
            .iter()
            .filter(|(idx, _)| *idx == i)
            .map(|(_, dataset)| *dataset)
            .collect();
        let tag = if !feeds.is_empty() {
            format!("-> {}", feeds.join(", "))
        } else if name.ends_with(".json") {
            "(unused json)".to_string()
        } else if is_image(name) {
            "(image)".to_string()
        } else {
            String::new()
        };
        println!("  {:<70} {}", name, tag);
    }

    let missing: Vec<&str> = REGISTRY
        .iter()
        .filter(|d| archive.find_json(d.locate_pattern).is_none())
        .map(|d| d.name)
        .collect();
    println!();
    println!("Datasets found:   {}/{}", resolved.len(), REGISTRY.len());
    if !missing.is_empty() {
        println!("Datasets missing: {}", missing.join(", "));
    }
    Ok(())
}
