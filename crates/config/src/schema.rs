//! Config file schema. Every key is optional; CLI flags override them.

use serde::{Deserialize, Serialize};

pub const DEFAULT_OUT_DIR: &str = "micros";
pub const DEFAULT_PROXY_BASE: &str = "https://velcrafting.com/labs";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrolabConfig {
    /// Hosting account (user or org) that owns generated repositories.
    pub owner: Option<String>,
    /// Name written into `lab.json` and the generated LICENSE.
    pub author: Option<String>,
    /// Directory that receives new projects, relative to the working dir.
    pub out_dir: String,
    /// Secondary registry location, `~` allowed.
    pub engine_path: Option<String>,
    /// Registry tags used when `--tags` is not given.
    pub tags: Vec<String>,
    /// Reverse-proxy base; a project lives at `<proxy_base>/<slug>`.
    pub proxy_base: String,
    /// Register the Tailwind typography/forms/aspect-ratio plugins.
    pub plugins: bool,
}

impl Default for MicrolabConfig {
    fn default() -> Self {
        Self {
            owner: None,
            author: None,
            out_dir: DEFAULT_OUT_DIR.into(),
            engine_path: None,
            tags: Vec::new(),
            proxy_base: DEFAULT_PROXY_BASE.into(),
            plugins: true,
        }
    }
}

impl MicrolabConfig {
    /// `proxy_base` without a trailing slash.
    pub fn proxy_base(&self) -> &str {
        self.proxy_base.trim_end_matches('/')
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: MicrolabConfig = toml::from_str("owner = \"velcrafting\"\n").unwrap();
        assert_eq!(cfg.owner.as_deref(), Some("velcrafting"));
        assert_eq!(cfg.out_dir, "micros");
        assert_eq!(cfg.proxy_base(), "https://velcrafting.com/labs");
        assert!(cfg.plugins);
    }

    #[test]
    fn proxy_base_trims_trailing_slash() {
        let cfg = MicrolabConfig {
            proxy_base: "https://example.com/labs/".into(),
            ..Default::default()
        };
        assert_eq!(cfg.proxy_base(), "https://example.com/labs");
    }
}
