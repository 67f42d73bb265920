//! Clean the destination directory

use anyhow::{Context, Result};

use crate::generator::Writer;
use crate::Elyse;

/// Remove everything inside the destination directory
pub fn run(elyse: &Elyse) -> Result<()> {
    Writer::new(&elyse.dest_dir)
        .clean()
        .with_context(|| format!("Failed to clean {:?}", elyse.dest_dir))?;
    tracing::info!("Cleaned: {:?}", elyse.dest_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_destination() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("build");
        fs::create_dir_all(dest.join("old/nested")).unwrap();
        fs::write(dest.join("stale.html"), "x").unwrap();

        let elyse = Elyse::with_config(dir.path(), &dest, SiteConfig::default()).unwrap();
        run(&elyse).unwrap();

        assert!(dest.is_dir());
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 0);
    }
}
