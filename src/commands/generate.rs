//! Generate static files

use anyhow::{Context, Result};

use super::{assets, clean, scripts};
use crate::generator::{Generator, Summary};
use crate::Elyse;

/// Full run: clean, pre-scripts, assets, content, post-scripts
pub fn run(elyse: &Elyse) -> Result<Summary> {
    let start = std::time::Instant::now();

    clean::run(elyse)?;
    scripts::run_all(elyse, &elyse.config.pre_scripts);
    assets::run(elyse)?;

    let generator = Generator::new(elyse).context("Failed to load templates")?;
    let summary = generator.generate().context("Generation failed")?;

    scripts::run_all(elyse, &elyse.config.post_scripts);

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());
    if summary.skipped > 0 {
        tracing::info!("{} items were skipped, see warnings above", summary.skipped);
    }

    Ok(summary)
}
