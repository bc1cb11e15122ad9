use std::{fs, path::Path};

use {
    anyhow::{Context, Result},
    microlab_registry::{RegistryStore, render_index},
    tracing::{info, warn},
};

const INDEX_FILE: &str = "index.html";

/// Render `<dir>/registry.json` to `out`, or `<dir>/index.html`.
pub fn handle_index(dir: &Path, out: Option<&Path>) -> Result<()> {
    let store = RegistryStore::new(dir);
    let loaded = store.load()?;
    if let Some(warning) = &loaded.warning {
        warn!(kind = warning.kind.label(), "{}", warning.message);
    }

    let entries = loaded.entries();
    let html = render_index(&entries)?;
    let target = out.map_or_else(|| dir.join(INDEX_FILE), Path::to_path_buf);
    fs::write(&target, html).with_context(|| format!("failed to write {}", target.display()))?;

    info!(path = %target.display(), entries = entries.len(), "index rendered");
    println!(
        "Wrote {} ({} entries)",
        target.display(),
        entries.len()
    );
    Ok(())
}
