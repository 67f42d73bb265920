//! Launch `pre_scripts` / `post_scripts`
//!
//! Scripts live in `<source>/scripts/` and run with the source directory as
//! working directory. Their failures are reported but never stop a run.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::config::ScriptSpec;
use crate::Elyse;

/// Run each script in order
pub fn run_all(elyse: &Elyse, scripts: &[ScriptSpec]) {
    for script in scripts {
        run(elyse, script);
    }
}

/// Start one script; wait for it only when it asks for that
pub fn run(elyse: &Elyse, script: &ScriptSpec) {
    let path = elyse.scripts_dir().join(script.name());
    let path = match fs::canonicalize(&path) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Script {:?} not found: {}", path, e);
            return;
        }
    };

    let mut command = Command::new(&path);
    command
        .args(script.args())
        .current_dir(absolute(&elyse.source_dir))
        .env("ELYSE_SOURCE", absolute(&elyse.source_dir))
        .env("ELYSE_DESTINATION", absolute(&elyse.dest_dir));

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!("Failed to start script {:?}: {}", path, e);
            return;
        }
    };

    if !script.wait() {
        tracing::info!("Started script {:?} (pid {})", path, child.id());
        return;
    }

    match child.wait() {
        Ok(status) if status.success() => tracing::info!("Script {:?} finished", path),
        Ok(status) => tracing::warn!("Script {:?} exited with {}", path, status),
        Err(e) => tracing::warn!("Failed to wait for script {:?}: {}", path, e),
    }
}

fn absolute(path: &std::path::Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
