//! Copy `assets/` to the destination

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use crate::generator::Writer;
use crate::Elyse;

/// Copy every file under `assets/` to `dest/assets/`, keeping the layout
pub fn run(elyse: &Elyse) -> Result<usize> {
    let assets_dir = elyse.assets_dir();
    if !assets_dir.is_dir() {
        tracing::debug!("No assets in {:?}", assets_dir);
        return Ok(0);
    }

    let writer = Writer::new(&elyse.dest_dir);
    let mut copied = 0;

    for entry in WalkDir::new(&assets_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(&assets_dir)?;
        writer
            .copy(path, Path::new("assets").join(relative))
            .with_context(|| format!("Failed to copy asset {:?}", path))?;
        copied += 1;
    }

    tracing::info!("Copied {} assets", copied);
    Ok(copied)
}
