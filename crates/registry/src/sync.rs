//! Upserting one entry into several catalog locations.
//!
//! The primary location is always written. A secondary location is written
//! only when it resolves to a different directory. The writes are
//! independent: one failing does not affect the other, and nothing keeps
//! the two catalogs consistent beyond receiving the same entry.

use std::path::{Path, PathBuf};

use {
    microlab_common::{CommandRunner, Warning, WarningKind},
    tracing::debug,
};

use crate::{
    entry::RegistryEntry,
    store::{RegistryStore, UpsertResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTarget {
    pub label: &'static str,
    pub dir: PathBuf,
}

/// Result of upserting into one location. `result` is `None` when the
/// write itself failed; the failure is in `warnings`.
#[derive(Debug, Clone)]
pub struct LocationReport {
    pub target: RegistryTarget,
    pub result: Option<UpsertResult>,
    pub warnings: Vec<Warning>,
}

/// The locations to write: the primary, plus the secondary when its
/// absolute path differs.
pub fn registry_targets(primary: &Path, secondary: Option<&Path>) -> Vec<RegistryTarget> {
    let mut targets = vec![RegistryTarget {
        label: "local registry",
        dir: primary.to_path_buf(),
    }];

    if let Some(secondary) = secondary {
        if resolve(secondary) == resolve(primary) {
            debug!(path = %secondary.display(), "engine registry is the local registry, skipping");
        } else {
            targets.push(RegistryTarget {
                label: "engine registry",
                dir: secondary.to_path_buf(),
            });
        }
    }
    targets
}

/// Upsert `entry` into every target. Never fails as a whole.
pub fn sync_registries(
    primary: &Path,
    secondary: Option<&Path>,
    entry: &RegistryEntry,
    vcs: &dyn CommandRunner,
) -> Vec<LocationReport> {
    registry_targets(primary, secondary)
        .into_iter()
        .map(|target| {
            let store = RegistryStore::new(&target.dir);
            match store.upsert(entry.clone(), vcs) {
                Ok(report) => LocationReport {
                    target,
                    result: Some(report.result),
                    warnings: report.warnings,
                },
                Err(e) => {
                    let warning = Warning::new(
                        WarningKind::RegistryWrite,
                        format!("failed to update {}: {e}", target.label),
                    );
                    LocationReport {
                        target,
                        result: None,
                        warnings: vec![warning],
                    }
                },
            }
        })
        .collect()
}

fn resolve(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::store::REGISTRY_FILE, microlab_common::command::testing::ScriptedRunner};

    fn entry() -> RegistryEntry {
        RegistryEntry {
            slug: "viz".into(),
            title: Some("Viz".into()),
            ..Default::default()
        }
    }

    #[test]
    fn same_location_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let alias = dir.path().join(".");
        let targets = registry_targets(dir.path(), Some(&alias));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].label, "local registry");
    }

    #[test]
    fn both_locations_receive_the_entry() {
        let local = tempfile::tempdir().unwrap();
        let engine = tempfile::tempdir().unwrap();
        let vcs = ScriptedRunner::new().fail("git rev-parse");

        let reports = sync_registries(local.path(), Some(engine.path()), &entry(), &vcs);
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.result.is_some()));
        assert!(local.path().join(REGISTRY_FILE).exists());
        assert!(engine.path().join(REGISTRY_FILE).exists());
    }

    #[test]
    fn missing_secondary_does_not_affect_primary() {
        let local = tempfile::tempdir().unwrap();
        let missing = local.path().join("no-such-engine");
        let vcs = ScriptedRunner::new().fail("git rev-parse");

        let reports = sync_registries(local.path(), Some(&missing), &entry(), &vcs);
        assert_eq!(reports[0].result, Some(UpsertResult::Appended { index: 0 }));
        assert_eq!(reports[1].result, Some(UpsertResult::Skipped));
        assert_eq!(
            reports[1].warnings[0].kind,
            WarningKind::RegistryLocationMissing
        );
    }

    #[test]
    fn write_failure_becomes_a_warning() {
        let local = tempfile::tempdir().unwrap();
        // A directory where the catalog file should be makes the read fail.
        std::fs::create_dir(local.path().join(REGISTRY_FILE)).unwrap();
        let vcs = ScriptedRunner::new();

        let reports = sync_registries(local.path(), None, &entry(), &vcs);
        assert!(reports[0].result.is_none());
        assert_eq!(reports[0].warnings[0].kind, WarningKind::RegistryWrite);
    }
}
