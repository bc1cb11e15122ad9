use std::{
    fmt::Write as _,
    io::{self, BufRead, Write},
};

use {
    anyhow::{Context, Result, bail},
    clap::Args,
    microlab_common::SystemRunner,
    microlab_config::{FeatureFlags, FeatureSet, MicrolabConfig, expand_home},
    microlab_scaffold::{ScaffoldReport, ScaffoldRequest, Scaffolder, steps::repo_spec},
    tracing::debug,
};

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Project name; prompted for when omitted.
    #[arg(short, long)]
    pub name: Option<String>,

    /// `vanilla` (default) or anything starting with `react`.
    #[arg(short, long)]
    pub template: Option<String>,

    /// Short description (default: `Tiny demo <slug>`).
    #[arg(short, long)]
    pub desc: Option<String>,

    /// Append a three.js demo.
    #[arg(long)]
    pub three: bool,

    /// Append a d3 demo.
    #[arg(long)]
    pub d3: bool,

    /// Append a Chart.js demo.
    #[arg(long)]
    pub charts: bool,

    /// Add a web app manifest.
    #[arg(long)]
    pub pwa: bool,

    /// Skip the Tailwind typography/forms/aspect-ratio plugins.
    #[arg(long)]
    pub no_plugins: bool,

    /// Create the GitHub repository and push.
    #[arg(long)]
    pub push: bool,

    /// GitHub user or org owning the repository.
    #[arg(long)]
    pub owner: Option<String>,

    /// Create the repository as private.
    #[arg(long)]
    pub private: bool,

    /// Directory receiving new projects (default: `micros`).
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Second registry location to update, `~` allowed.
    #[arg(long)]
    pub engine_path: Option<String>,

    /// Comma-separated registry tags.
    #[arg(long)]
    pub tags: Option<String>,

    /// `react-tool`, `react-three` or `vanilla-tool`.
    #[arg(short, long)]
    pub preset: Option<String>,
}

impl CreateArgs {
    fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags {
            template: self.template.clone(),
            three: self.three,
            d3: self.d3,
            charts: self.charts,
            pwa: self.pwa,
            no_plugins: self.no_plugins,
            private: self.private,
            owner: self.owner.clone(),
            out_dir: self.out_dir.clone(),
            tags: self.tags.clone(),
        }
    }
}

fn prompt_name() -> Result<String> {
    print!("Project name: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read project name")?;
    Ok(line.trim().to_string())
}

pub fn handle_create(args: CreateArgs, config: &MicrolabConfig) -> Result<()> {
    if let Some(preset) = &args.preset {
        debug!(preset, "preset requested");
    }

    let name = match args.name.clone() {
        Some(name) => name,
        None => prompt_name()?,
    };
    if name.trim().is_empty() {
        bail!("Name is required");
    }

    let features = FeatureSet::resolve(&args.feature_flags(), config);
    let engine_path = args
        .engine_path
        .as_deref()
        .or(config.engine_path.as_deref())
        .filter(|p| !p.trim().is_empty())
        .map(expand_home);

    let request = ScaffoldRequest {
        name,
        description: args.desc.clone(),
        features,
        push: args.push,
        engine_path,
    };

    let workdir = std::env::current_dir().context("cannot determine working directory")?;
    let runner = SystemRunner;
    let report = Scaffolder::new(&runner, workdir, config).run(&request)?;

    print!("{}", closing_summary(&report, &request));
    Ok(())
}

/// Text printed after a successful run.
pub fn closing_summary(report: &ScaffoldReport, request: &ScaffoldRequest) -> String {
    let slug = &report.identity.slug;
    let dir = report.display_dir.display();
    let mut out = String::new();

    let _ = writeln!(out, "\nCreated micro {slug}\n");
    let _ = writeln!(out, "Next:\n  cd {dir}\n  npm run dev");

    if let Some(remote) = &report.remote {
        let _ = writeln!(out, "\nPushed to https://github.com/{remote}");
    } else if !request.push {
        let _ = writeln!(
            out,
            "\nPush to GitHub:\n  gh repo create {} --public --source=. --push\n  # In the repo Settings > Pages > Source = GitHub Actions",
            repo_spec(request.features.owner(), slug)
        );
    }

    let warnings: Vec<_> = report
        .summary
        .warnings()
        .iter()
        .filter(|w| !w.kind.is_informational())
        .collect();
    if !warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    if report.needs_node_note() {
        let version = report
            .node_major
            .map(|major| format!("Your Node.js major version is {major}. "))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "\nNote: {version}Vite and modern tooling often require Node >= 20.\n- Recommend: install Node 20+ (e.g., via nvm: nvm install 20 && nvm use 20)\n- Then in {dir}: npm ci (or npm i) to finish installing."
        );
    }
    out
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        microlab_common::{RunSummary, Warning, WarningKind},
        microlab_scaffold::{ProjectIdentity, ProjectUrls},
        std::path::PathBuf,
    };

    fn report(summary: RunSummary, node_major: Option<u32>) -> ScaffoldReport {
        ScaffoldReport {
            identity: ProjectIdentity::resolve("viz").unwrap(),
            description: "Tiny demo viz".into(),
            project_dir: PathBuf::from("/w/micros/viz"),
            display_dir: PathBuf::from("micros/viz"),
            urls: ProjectUrls::new(Some("octocat"), "viz", "https://velcrafting.com/labs"),
            registries: Vec::new(),
            remote: None,
            node_major,
            summary,
        }
    }

    fn request(push: bool, owner: Option<&str>) -> ScaffoldRequest {
        let flags = FeatureFlags {
            owner: owner.map(String::from),
            ..Default::default()
        };
        ScaffoldRequest {
            name: "viz".into(),
            description: None,
            features: FeatureSet::resolve(&flags, &MicrolabConfig::default()),
            push,
            engine_path: None,
        }
    }

    #[test]
    fn clean_run_summary() {
        let text = closing_summary(&report(RunSummary::new(), Some(22)), &request(false, None));
        assert!(text.contains("Created micro viz"));
        assert!(text.contains("  cd micros/viz\n  npm run dev"));
        assert!(text.contains("gh repo create viz --public --source=. --push"));
        assert!(!text.contains("Warnings:"));
        assert!(!text.contains("Node >= 20"));
    }

    #[test]
    fn push_hint_uses_explicit_owner_and_is_skipped_when_pushing() {
        let text = closing_summary(&report(RunSummary::new(), Some(20)), &request(false, Some("velcrafting")));
        assert!(text.contains("gh repo create velcrafting/viz --public"));

        let text = closing_summary(&report(RunSummary::new(), Some(20)), &request(true, None));
        assert!(!text.contains("Push to GitHub"));
    }

    #[test]
    fn warnings_and_node_note_are_listed() {
        let mut summary = RunSummary::new();
        summary.warn(Warning::new(WarningKind::DependencyInstall, "npm i failed"));
        summary.warn(Warning::new(WarningKind::RegistryLocationMissing, "no engine dir"));

        let text = closing_summary(&report(summary, Some(18)), &request(false, None));
        assert!(text.contains("Warnings:\n  - dependency install: npm i failed\n"));
        assert!(!text.contains("no engine dir"));
        assert!(text.contains("Your Node.js major version is 18."));
        assert!(text.contains("- Then in micros/viz: npm ci"));
    }

    #[test]
    fn old_node_alone_triggers_note() {
        let text = closing_summary(&report(RunSummary::new(), Some(18)), &request(false, None));
        assert!(text.contains("Node >= 20"));
    }
}
