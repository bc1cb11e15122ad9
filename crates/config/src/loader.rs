use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::MicrolabConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "microlab.toml",
    "microlab.yaml",
    "microlab.yml",
    "microlab.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<MicrolabConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations relative to the
/// current directory.
pub fn discover_and_load() -> MicrolabConfig {
    discover_and_load_from(Path::new("."))
}

/// Discover and load config, searching `root` first.
///
/// Search order:
/// 1. `<root>/microlab.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/microlab/microlab.{toml,yaml,yml,json}` (user-global)
///
/// Returns `MicrolabConfig::default()` if no config file is found or the
/// one found cannot be parsed.
pub fn discover_and_load_from(root: &Path) -> MicrolabConfig {
    let found = find_in(root).or_else(|| config_dir().and_then(|dir| find_in(&dir)));
    let Some(path) = found else {
        debug!("no config file found, using defaults");
        return MicrolabConfig::default();
    };

    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            MicrolabConfig::default()
        },
    }
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Returns the user-global config directory (`~/.config/microlab/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "microlab").map(|d| d.config_dir().to_path_buf())
}

/// Expand a leading `~` or `~/` against the home directory.
///
/// Other paths, including `~user`, are returned unchanged.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = || directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());
    if raw == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = home()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<MicrolabConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
