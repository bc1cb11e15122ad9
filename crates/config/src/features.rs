//! The per-run feature set.
//!
//! [`FeatureFlags`] is what the command line said; [`FeatureSet`] is the
//! resolved, immutable record the rest of the run reads. Resolution happens
//! once and the result has no setters.

use std::{collections::BTreeSet, path::PathBuf};

use crate::{loader::expand_home, schema::MicrolabConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Template {
    #[default]
    Vanilla,
    React,
}

impl Template {
    /// Anything starting with `react` (any case) selects React; everything
    /// else, including unknown values, is vanilla.
    pub fn from_flag(raw: &str) -> Self {
        if raw.trim().to_lowercase().starts_with("react") {
            Self::React
        } else {
            Self::Vanilla
        }
    }

    pub fn is_react(self) -> bool {
        self == Self::React
    }

    /// Template name passed to the Vite scaffolder.
    pub fn vite_template(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla-ts",
            Self::React => "react-ts",
        }
    }

    /// The single entry file, relative to the project root.
    pub fn entry_file(self) -> &'static str {
        match self {
            Self::Vanilla => "src/main.ts",
            Self::React => "src/main.tsx",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vanilla => "vanilla",
            Self::React => "react",
        }
    }

    fn default_tags(self) -> Vec<String> {
        vec![self.as_str().to_string(), "tailwind".to_string()]
    }
}

/// Optional add-ons. Declaration order is the order their blocks are
/// appended to the entry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Addon {
    Three,
    D3,
    Charts,
    Pwa,
}

impl Addon {
    pub fn name(self) -> &'static str {
        match self {
            Self::Three => "three",
            Self::D3 => "d3",
            Self::Charts => "charts",
            Self::Pwa => "pwa",
        }
    }

    /// Runtime npm package the add-on needs, if any.
    pub fn npm_package(self) -> Option<&'static str> {
        match self {
            Self::Three => Some("three"),
            Self::D3 => Some("d3"),
            Self::Charts => Some("chart.js"),
            Self::Pwa => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn gh_flag(self) -> &'static str {
        match self {
            Self::Public => "--public",
            Self::Private => "--private",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// Unresolved selections, as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    pub template: Option<String>,
    pub three: bool,
    pub d3: bool,
    pub charts: bool,
    pub pwa: bool,
    pub no_plugins: bool,
    pub private: bool,
    pub owner: Option<String>,
    pub out_dir: Option<String>,
    pub tags: Option<String>,
}

/// Resolved options for one scaffolding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    template: Template,
    addons: BTreeSet<Addon>,
    plugins_enabled: bool,
    visibility: Visibility,
    output_dir: PathBuf,
    owner: Option<String>,
    tags: Vec<String>,
}

impl FeatureSet {
    /// Combine flags with config. Flags win; config fills the gaps; built-in
    /// defaults cover the rest.
    pub fn resolve(flags: &FeatureFlags, config: &MicrolabConfig) -> Self {
        let template = flags
            .template
            .as_deref()
            .map(Template::from_flag)
            .unwrap_or_default();

        let addons = [
            (flags.three, Addon::Three),
            (flags.d3, Addon::D3),
            (flags.charts, Addon::Charts),
            (flags.pwa, Addon::Pwa),
        ]
        .into_iter()
        .filter_map(|(on, addon)| on.then_some(addon))
        .collect();

        let owner = flags
            .owner
            .as_deref()
            .or(config.owner.as_deref())
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from);

        let mut tags = flags.tags.as_deref().map(parse_tags).unwrap_or_default();
        if tags.is_empty() {
            tags = config.tags.clone();
        }
        if tags.is_empty() {
            tags = template.default_tags();
        }

        let out_dir = flags.out_dir.as_deref().unwrap_or(&config.out_dir);

        Self {
            template,
            addons,
            plugins_enabled: config.plugins && !flags.no_plugins,
            visibility: if flags.private {
                Visibility::Private
            } else {
                Visibility::Public
            },
            output_dir: expand_home(out_dir),
            owner,
            tags,
        }
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn has(&self, addon: Addon) -> bool {
        self.addons.contains(&addon)
    }

    /// Enabled add-ons in append order.
    pub fn addons(&self) -> impl Iterator<Item = Addon> + '_ {
        self.addons.iter().copied()
    }

    pub fn plugins_enabled(&self) -> bool {
        self.plugins_enabled
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Split a comma-separated tag list, trimming and dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
