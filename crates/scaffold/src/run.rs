//! One scaffolding run, start to finish.

use std::path::{Path, PathBuf};

use {
    chrono::Utc,
    microlab_common::{CommandRunner, RunSummary, WarningKind},
    microlab_config::{Addon, FeatureSet, MicrolabConfig},
    microlab_registry::{LocationReport, RegistryEntry, sync_registries},
    tracing::{info, warn},
};

use crate::{
    entry::{addon_block, rewrite_react_entry, vanilla_entry},
    error::Result,
    identity::ProjectIdentity,
    manifest::ManifestPatcher,
    pipeline::TemplatePipeline,
    steps,
    templates::{self, TSCONFIG, TemplateContext},
    urls::ProjectUrls,
};

const MARKUP_FILE: &str = "index.html";

/// What the caller asked for.
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
    pub name: String,
    /// Defaults to `Tiny demo <slug>`.
    pub description: Option<String>,
    pub features: FeatureSet,
    pub push: bool,
    /// Second catalog location, written when it differs from the working
    /// directory.
    pub engine_path: Option<PathBuf>,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct ScaffoldReport {
    pub identity: ProjectIdentity,
    pub description: String,
    pub project_dir: PathBuf,
    /// `project_dir` relative to the working directory when possible.
    pub display_dir: PathBuf,
    pub urls: ProjectUrls,
    pub registries: Vec<LocationReport>,
    /// `owner/slug` of the created remote, when `push` succeeded.
    pub remote: Option<String>,
    pub node_major: Option<u32>,
    pub summary: RunSummary,
}

impl ScaffoldReport {
    /// Install failed or the local Node.js is older than the tooling needs.
    pub fn needs_node_note(&self) -> bool {
        self.summary.has(WarningKind::DependencyInstall)
            || self
                .node_major
                .is_some_and(|major| major < steps::MIN_NODE_MAJOR)
    }
}

/// Runs scaffolding in a working directory. The working directory is the
/// primary catalog location and the base for a relative output directory.
pub struct Scaffolder<'a> {
    runner: &'a dyn CommandRunner,
    workdir: PathBuf,
    author: Option<String>,
    proxy_base: String,
}

impl<'a> Scaffolder<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        workdir: impl Into<PathBuf>,
        config: &MicrolabConfig,
    ) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            author: config.author.clone().filter(|a| !a.trim().is_empty()),
            proxy_base: config.proxy_base().to_string(),
        }
    }

    pub fn run(&self, request: &ScaffoldRequest) -> Result<ScaffoldReport> {
        let identity = ProjectIdentity::resolve(&request.name)?;
        let slug = identity.slug.as_str();
        let features = &request.features;
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("Tiny demo {slug}"));

        let project_dir = self.workdir.join(features.output_dir()).join(slug);
        let display_dir = display_path(&self.workdir, &project_dir);
        let pipeline = TemplatePipeline::create(&project_dir)?;
        info!(slug, dir = %project_dir.display(), template = features.template().as_str(), "creating micro");

        let mut summary = RunSummary::new();

        steps::scaffold_vite(self.runner, &project_dir, features)?;
        summary.record(steps::install_dependencies(self.runner, &project_dir, features));

        let owner = steps::resolve_owner(self.runner, &self.workdir, features.owner());
        let urls = ProjectUrls::new(owner.as_deref(), slug, &self.proxy_base);
        let author = self
            .author
            .clone()
            .or_else(|| owner.clone())
            .unwrap_or_else(|| urls.owner.clone());

        let ctx = TemplateContext {
            identity: &identity,
            desc: &description,
            urls: &urls,
            features,
            author: &author,
            now: Utc::now(),
        };

        for file in templates::project_files(&ctx)? {
            pipeline.write_static_file(file.path, &file.contents)?;
        }
        pipeline.write_if_absent("tsconfig.json", TSCONFIG)?;
        pipeline.mutate_markup(MARKUP_FILE, &templates::markup_injections(&ctx))?;
        self.write_entry(&pipeline, &identity, &description, features)?;

        ManifestPatcher::new(features.has(Addon::Pwa)).patch_file(&project_dir)?;

        let entry = RegistryEntry {
            slug: slug.to_string(),
            title: Some(identity.display_title.clone()),
            desc: Some(description.clone()),
            owner: Some(urls.owner.clone()),
            base: Some(urls.pages.clone()),
            proxy: Some(urls.proxy.clone()),
            updated: None,
            tags: features.tags().to_vec(),
            extra: Default::default(),
        };
        let registries = sync_registries(
            &self.workdir,
            request.engine_path.as_deref(),
            &entry,
            self.runner,
        );
        for report in &registries {
            if let Some(result) = &report.result {
                info!(location = report.target.label, ?result, "registry updated");
            }
            summary.extend(report.warnings.iter().cloned());
        }

        steps::init_repository(self.runner, &project_dir)?;

        let remote = if request.push {
            summary.record(steps::create_remote(
                self.runner,
                &project_dir,
                &display_dir,
                slug,
                owner.as_deref(),
                features.visibility(),
            ))
        } else {
            None
        };

        let node_major = steps::node_major(self.runner, &self.workdir);

        let report = ScaffoldReport {
            identity,
            description,
            project_dir,
            display_dir,
            urls,
            registries,
            remote,
            node_major,
            summary,
        };
        info!(slug = %report.identity.slug, warnings = report.summary.warnings().len(), "micro created");
        Ok(report)
    }

    fn write_entry(
        &self,
        pipeline: &TemplatePipeline,
        identity: &ProjectIdentity,
        description: &str,
        features: &FeatureSet,
    ) -> Result<()> {
        let entry_file = features.template().entry_file();
        let title = identity.raw_name.as_str();

        if features.template().is_react() {
            let rewritten = rewrite_react_entry(&pipeline.read(entry_file)?, title, description);
            if !rewritten.layout_replaced {
                warn!(file = entry_file, "no StrictMode block found, layout not inserted");
            }
            pipeline.write_static_file(entry_file, &rewritten.source)?;
        } else {
            pipeline.write_static_file(entry_file, &vanilla_entry(title, description))?;
        }

        for block in features.addons().filter_map(addon_block) {
            pipeline.append_entry_script(entry_file, &block)?;
        }
        Ok(())
    }
}

fn display_path(workdir: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(workdir) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_is_relative_when_possible() {
        assert_eq!(
            display_path(Path::new("/w"), Path::new("/w/micros/viz")),
            PathBuf::from("micros/viz")
        );
        assert_eq!(display_path(Path::new("/w"), Path::new("/w")), PathBuf::from("."));
        assert_eq!(
            display_path(Path::new("/w"), Path::new("/elsewhere/viz")),
            PathBuf::from("/elsewhere/viz")
        );
    }
}
