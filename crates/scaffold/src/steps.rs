//! External tool steps: the Vite scaffolder, npm, git and the GitHub CLI.
//!
//! Required steps return [`Result`] and abort the run. Optional ones return
//! an [`Outcome`] whose warning ends up in the run summary.

use std::path::Path;

use {
    microlab_common::{CommandRunner, Invocation, Outcome, Warning, WarningKind},
    microlab_config::{FeatureSet, Visibility},
    tracing::{debug, info, warn},
};

use crate::{error::Result, templates::STYLE_PLUGINS};

/// Minimum Node.js major version current Vite needs.
pub const MIN_NODE_MAJOR: u32 = 20;

const DEV_TOOLING: [&str; 4] = ["tailwindcss", "postcss", "autoprefixer", "@types/node"];

/// Run `npm create vite@latest . -- --template <t>` inside `dir`.
pub fn scaffold_vite(runner: &dyn CommandRunner, dir: &Path, features: &FeatureSet) -> Result<()> {
    let template = features.template().vite_template();
    info!(dir = %dir.display(), template, "scaffolding vite project");
    runner.run(&Invocation::new("npm", dir).args([
        "create",
        "vite@latest",
        ".",
        "--",
        "--template",
        template,
    ]))?;
    Ok(())
}

/// The install commands for a feature set, in order.
pub fn install_plan(dir: &Path, features: &FeatureSet) -> Vec<Invocation> {
    let npm = |args: &[&str]| Invocation::new("npm", dir).args(args.iter().copied());

    let mut plan = vec![npm(&["i"])];
    plan.push(npm(&["i", "-D"]).args(DEV_TOOLING));
    if features.plugins_enabled() {
        plan.push(npm(&["i", "-D"]).args(STYLE_PLUGINS));
    }
    plan.extend(
        features
            .addons()
            .filter_map(|addon| addon.npm_package())
            .map(|package| npm(&["i", package])),
    );
    plan
}

/// Install dependencies. Stops at the first failing command.
pub fn install_dependencies(
    runner: &dyn CommandRunner,
    dir: &Path,
    features: &FeatureSet,
) -> Outcome<()> {
    info!("installing dependencies");
    for invocation in install_plan(dir, features) {
        if let Err(e) = runner.run(&invocation) {
            return Err(Warning::new(
                WarningKind::DependencyInstall,
                format!("dependency install failed ({e}); the project files are still written"),
            ));
        }
    }
    Ok(())
}

fn gh(cwd: &Path) -> Invocation {
    Invocation::new("gh", cwd)
}

pub fn gh_available(runner: &dyn CommandRunner, cwd: &Path) -> bool {
    runner.try_run(&gh(cwd).arg("--version"))
}

/// The login of the authenticated GitHub CLI user, if the CLI is present.
pub fn gh_login(runner: &dyn CommandRunner, cwd: &Path) -> Option<String> {
    if !gh_available(runner, cwd) {
        debug!("gh not available, cannot look up owner");
        return None;
    }
    runner.output(&gh(cwd).args(["api", "user", "-q", ".login"]))
}

/// `explicit` when given, else the GitHub CLI login.
pub fn resolve_owner(
    runner: &dyn CommandRunner,
    cwd: &Path,
    explicit: Option<&str>,
) -> Option<String> {
    explicit
        .map(String::from)
        .or_else(|| gh_login(runner, cwd))
}

/// `git init -b main`, stage everything, commit `init`.
pub fn init_repository(runner: &dyn CommandRunner, dir: &Path) -> Result<()> {
    info!(dir = %dir.display(), "initializing git");
    let git = || Invocation::new("git", dir);
    runner.run(&git().args(["init", "-b", "main"]))?;
    runner.run(&git().args(["add", "-A"]))?;
    runner.run(&git().args(["commit", "-m", "init"]))?;
    Ok(())
}

/// `[owner/]slug` as `gh repo create` expects it.
pub fn repo_spec(owner: Option<&str>, slug: &str) -> String {
    match owner {
        Some(owner) => format!("{owner}/{slug}"),
        None => slug.to_string(),
    }
}

/// Create the GitHub repository from `dir` and push to it.
///
/// `display_dir` is how the directory is shown in fallback instructions.
pub fn create_remote(
    runner: &dyn CommandRunner,
    dir: &Path,
    display_dir: &Path,
    slug: &str,
    owner: Option<&str>,
    visibility: Visibility,
) -> Outcome<String> {
    if !gh_available(runner, dir) {
        return Err(Warning::new(
            WarningKind::RemoteCreate,
            format!(
                "GitHub CLI not found, skipped repository creation. Install it or run:\n  gh repo create {} --public --source={} --push",
                repo_spec(owner, slug),
                dir.display()
            ),
        ));
    }

    let owner = owner
        .map(String::from)
        .or_else(|| runner.output(&gh(dir).args(["api", "user", "-q", ".login"])));
    let repo = repo_spec(owner.as_deref(), slug);
    info!(repo = %repo, visibility = visibility.as_str(), "creating GitHub repository");

    let create = gh(dir).args([
        "repo".to_string(),
        "create".to_string(),
        repo.clone(),
        visibility.gh_flag().to_string(),
        format!("--source={}", dir.display()),
        "--push".to_string(),
    ]);
    match runner.run(&create) {
        Ok(()) => Ok(repo),
        Err(e) => {
            warn!(error = %e, "gh repo create failed");
            Err(Warning::new(
                WarningKind::RemoteCreate,
                format!(
                    "failed to create the repository via gh. Manual steps:\n  cd {}\n  gh repo create {repo} {} --source=. --push",
                    display_dir.display(),
                    visibility.gh_flag()
                ),
            ))
        },
    }
}

/// Major version reported by `node --version`, e.g. `20` for `v20.11.1`.
pub fn node_major(runner: &dyn CommandRunner, cwd: &Path) -> Option<u32> {
    let version = runner.output(&Invocation::new("node", cwd).arg("--version"))?;
    parse_node_major(&version)
}

fn parse_node_major(version: &str) -> Option<u32> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .next()?
        .parse()
        .ok()
}
