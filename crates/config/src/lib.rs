//! Configuration loading and the per-run feature set.
//!
//! Config files: `microlab.toml`, `microlab.yaml` or `microlab.json`.
//! Searched in `./` then `~/.config/microlab/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod features;
pub mod loader;
pub mod schema;

pub use {
    features::{Addon, FeatureFlags, FeatureSet, Template, Visibility, parse_tags},
    loader::{config_dir, discover_and_load, discover_and_load_from, expand_home, load_config},
    schema::MicrolabConfig,
};
