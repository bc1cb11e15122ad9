use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use {
    chrono::{DateTime, Duration, SubsecRound, Utc},
    microlab_common::{CommandRunner, Invocation, Outcome, Warning, WarningKind},
    serde_json::Value,
    tracing::{debug, info},
};

use crate::{
    entry::RegistryEntry,
    error::{Context, Error, Result},
};

/// Catalog file name inside a registry directory.
pub const REGISTRY_FILE: &str = "registry.json";

/// What an upsert did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertResult {
    /// The registry directory does not exist; nothing was written.
    Skipped,
    /// A new entry was added at the end.
    Appended { index: usize },
    /// The entry with the same slug was replaced in place.
    Replaced { index: usize },
}

#[derive(Debug, Clone)]
pub struct UpsertReport {
    pub result: UpsertResult,
    /// The entry as written, with its fresh `updated` stamp.
    pub entry: Option<RegistryEntry>,
    /// Whether the catalog change was committed to git.
    pub committed: bool,
    pub warnings: Vec<Warning>,
}

/// A catalog read from disk.
///
/// `items` are the array elements exactly as stored, so elements this
/// version cannot interpret are written back untouched. Only a document
/// that is not a JSON array loads as empty, with a warning.
#[derive(Debug, Clone, Default)]
pub struct LoadedRegistry {
    pub items: Vec<Value>,
    pub warning: Option<Warning>,
}

impl LoadedRegistry {
    /// Elements that decode as entries, in catalog order. Elements without
    /// a usable slug are skipped.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.items
            .iter()
            .filter_map(RegistryEntry::from_value)
            .collect()
    }

    fn position(&self, slug: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.get("slug").and_then(Value::as_str) == Some(slug))
    }
}

/// JSON catalog stored as `<dir>/registry.json`.
///
/// Writes replace the whole file. There is no locking: two runs writing the
/// same location race and the last writer wins.
pub struct RegistryStore {
    dir: PathBuf,
}

impl RegistryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(REGISTRY_FILE)
    }

    /// Read the catalog. A missing file is an empty catalog; a file that is
    /// not a JSON array is also treated as empty, with a `RegistryCorrupt`
    /// warning.
    pub fn load(&self) -> Result<LoadedRegistry> {
        let path = self.path();
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadedRegistry::default()),
            Err(e) => return Err(Error::io(path, e)),
        };

        let reason = match serde_json::from_str::<Value>(&data) {
            Ok(Value::Array(items)) => {
                return Ok(LoadedRegistry {
                    items,
                    warning: None,
                });
            },
            Ok(_) => "not a JSON array".to_string(),
            Err(e) => e.to_string(),
        };
        Ok(LoadedRegistry {
            items: Vec::new(),
            warning: Some(Warning::new(
                WarningKind::RegistryCorrupt,
                format!(
                    "invalid catalog in {} ({reason}); recreating as empty list",
                    path.display()
                ),
            )),
        })
    }

    /// Overwrite the catalog with `items`, pretty-printed.
    pub fn save(&self, items: &[Value]) -> Result<()> {
        let path = self.path();
        let mut data = serde_json::to_string_pretty(items)
            .with_context(|| format!("serialize {}", path.display()))?;
        data.push('\n');
        fs::write(&path, data).map_err(|e| Error::io(&path, e))?;
        debug!(path = %path.display(), entries = items.len(), "saved registry");
        Ok(())
    }

    /// Insert or replace `entry` by slug, stamp `updated`, persist, then try
    /// to commit the catalog with `vcs`.
    ///
    /// A missing directory is skipped rather than created. Commit failures
    /// are reported as warnings and never undo the write.
    pub fn upsert(
        &self,
        mut entry: RegistryEntry,
        vcs: &dyn CommandRunner,
    ) -> Result<UpsertReport> {
        if !self.dir.is_dir() {
            return Ok(UpsertReport {
                result: UpsertResult::Skipped,
                entry: None,
                committed: false,
                warnings: vec![Warning::new(
                    WarningKind::RegistryLocationMissing,
                    format!("registry path does not exist: {}", self.dir.display()),
                )],
            });
        }

        let mut catalog = self.load()?;
        let mut warnings: Vec<Warning> = catalog.warning.take().into_iter().collect();

        let existing = catalog.position(&entry.slug);
        let previous = existing
            .and_then(|i| RegistryEntry::from_value(&catalog.items[i]))
            .and_then(|e| e.updated);
        entry.updated = Some(next_timestamp(previous, Utc::now()));

        let value = serde_json::to_value(&entry)
            .with_context(|| format!("serialize entry {}", entry.slug))?;
        let result = match existing {
            Some(index) => {
                catalog.items[index] = value;
                UpsertResult::Replaced { index }
            },
            None => {
                catalog.items.push(value);
                UpsertResult::Appended {
                    index: catalog.items.len() - 1,
                }
            },
        };

        self.save(&catalog.items)?;
        info!(path = %self.path().display(), slug = %entry.slug, ?result, "updated registry");

        let committed = match self.commit(&entry.slug, vcs) {
            Ok(committed) => committed,
            Err(warning) => {
                warnings.push(warning);
                false
            },
        };

        Ok(UpsertReport {
            result,
            entry: Some(entry),
            committed,
            warnings,
        })
    }

    /// Stage and commit the catalog when the directory is in a git work
    /// tree. Returns `Ok(false)` when there is no work tree to commit to.
    fn commit(&self, slug: &str, vcs: &dyn CommandRunner) -> Outcome<bool> {
        let probe =
            Invocation::new("git", &self.dir).args(["rev-parse", "--is-inside-work-tree"]);
        if !vcs.try_run(&probe) {
            debug!(dir = %self.dir.display(), "registry is not in a git work tree, skipping commit");
            return Ok(false);
        }

        let add = Invocation::new("git", &self.dir).args(["add", REGISTRY_FILE]);
        let commit = Invocation::new("git", &self.dir)
            .args(["commit", "-m"])
            .arg(format!("Add/update micro: {slug}"));

        vcs.run(&add)
            .and_then(|()| vcs.run(&commit))
            .map(|()| true)
            .map_err(|e| {
                Warning::new(
                    WarningKind::RegistryCommit,
                    format!("could not commit {}: {e}", self.path().display()),
                )
            })
    }
}

/// Millisecond timestamp for a re-stamped entry, strictly after `previous`.
fn next_timestamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(3);
    match previous {
        Some(prev) if prev >= now => prev.trunc_subsecs(3) + Duration::milliseconds(1),
        _ => now,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone, microlab_common::command::testing::ScriptedRunner};

    fn entry(slug: &str, title: &str) -> RegistryEntry {
        RegistryEntry {
            slug: slug.into(),
            title: Some(title.into()),
            desc: Some(format!("Tiny demo {slug}")),
            tags: vec!["vanilla".into(), "tailwind".into()],
            ..Default::default()
        }
    }

    fn not_a_repo() -> ScriptedRunner {
        ScriptedRunner::new().fail("git rev-parse")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = RegistryStore::new(dir.path()).load().unwrap();
        assert!(loaded.entries().is_empty());
        assert!(loaded.warning.is_none());
    }

    #[test]
    fn upsert_appends_new_slug_last() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        let vcs = not_a_repo();

        store.upsert(entry("a", "A"), &vcs).unwrap();
        store.upsert(entry("b", "B"), &vcs).unwrap();
        let report = store.upsert(entry("c", "C"), &vcs).unwrap();

        assert_eq!(report.result, UpsertResult::Appended { index: 2 });
        let slugs: Vec<_> = store
            .load()
            .unwrap()
            .entries()
            .into_iter()
            .map(|e| e.slug)
            .collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn upsert_replaces_in_place_with_newer_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        let vcs = not_a_repo();

        store.upsert(entry("a", "A"), &vcs).unwrap();
        store.upsert(entry("b", "B"), &vcs).unwrap();
        store.upsert(entry("c", "C"), &vcs).unwrap();
        let before = store.load().unwrap().entries()[1].updated.unwrap();

        let report = store.upsert(entry("b", "B v2"), &vcs).unwrap();
        assert_eq!(report.result, UpsertResult::Replaced { index: 1 });

        let entries = store.load().unwrap().entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].slug, "b");
        assert_eq!(entries[1].title.as_deref(), Some("B v2"));
        assert!(entries[1].updated.unwrap() > before);
    }

    #[test]
    fn corrupt_file_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(REGISTRY_FILE), "{ not json").unwrap();
        let store = RegistryStore::new(dir.path());

        let report = store.upsert(entry("a", "A"), &not_a_repo()).unwrap();
        assert_eq!(report.result, UpsertResult::Appended { index: 0 });
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::RegistryCorrupt);
        assert_eq!(store.load().unwrap().entries().len(), 1);
    }

    #[test]
    fn non_array_document_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(REGISTRY_FILE), r#"{"slug":"a"}"#).unwrap();
        let loaded = RegistryStore::new(dir.path()).load().unwrap();
        assert!(loaded.entries().is_empty());
        assert_eq!(loaded.warning.unwrap().kind, WarningKind::RegistryCorrupt);
    }

    #[test]
    fn odd_elements_survive_an_upsert_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let odd = serde_json::json!({"slug": "keep-b", "updated": "2024-05-01", "tags": null});
        let stray = serde_json::json!({"note": "no slug here"});
        let original = serde_json::json!([
            {"slug": "keep-a", "title": "Keep A", "updated": "2024-04-01T00:00:00.000Z", "tags": []},
            odd,
            stray,
        ]);
        fs::write(dir.path().join(REGISTRY_FILE), original.to_string()).unwrap();
        let store = RegistryStore::new(dir.path());

        let report = store.upsert(entry("new", "New"), &not_a_repo()).unwrap();
        assert_eq!(report.result, UpsertResult::Appended { index: 3 });
        assert!(report.warnings.is_empty());

        let loaded = store.load().unwrap();
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.items.len(), 4);
        assert_eq!(loaded.items[0], original[0]);
        assert_eq!(loaded.items[1], odd);
        assert_eq!(loaded.items[2], stray);

        let slugs: Vec<_> = loaded.entries().into_iter().map(|e| e.slug).collect();
        assert_eq!(slugs, vec!["keep-a", "keep-b", "new"]);
    }

    #[test]
    fn odd_element_with_same_slug_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(REGISTRY_FILE),
            r#"[{"slug":"a","title":3,"updated":"2999-01-01"},{"slug":"b"}]"#,
        )
        .unwrap();
        let store = RegistryStore::new(dir.path());

        let report = store.upsert(entry("a", "A"), &not_a_repo()).unwrap();
        assert_eq!(report.result, UpsertResult::Replaced { index: 0 });
        let written = report.entry.unwrap();
        assert!(written.updated.unwrap() > Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap());

        let entries = store.load().unwrap().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn missing_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("absent"));
        let report = store.upsert(entry("a", "A"), &not_a_repo()).unwrap();
        assert_eq!(report.result, UpsertResult::Skipped);
        assert_eq!(
            report.warnings[0].kind,
            WarningKind::RegistryLocationMissing
        );
        assert!(!store.path().exists());
    }

    #[test]
    fn file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        store.upsert(entry("a", "A"), &not_a_repo()).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"slug\": \"a\","));
    }

    #[test]
    fn commits_inside_work_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        let vcs = ScriptedRunner::new();

        let report = store.upsert(entry("poster", "Poster"), &vcs).unwrap();
        assert!(report.committed);
        assert_eq!(vcs.command_lines(), vec![
            "git rev-parse --is-inside-work-tree",
            "git add registry.json",
            r#"git commit -m "Add/update micro: poster""#,
        ]);
    }

    #[test]
    fn commit_failure_keeps_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        let vcs = ScriptedRunner::new().fail("git commit");

        let report = store.upsert(entry("a", "A"), &vcs).unwrap();
        assert!(!report.committed);
        assert_eq!(report.warnings[0].kind, WarningKind::RegistryCommit);
        assert_eq!(store.load().unwrap().entries().len(), 1);
    }

    #[test]
    fn timestamps_stay_strictly_increasing() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(next_timestamp(None, now), now);
        assert_eq!(
            next_timestamp(Some(now), now),
            now + Duration::milliseconds(1)
        );
        let later = now + Duration::seconds(5);
        assert_eq!(next_timestamp(Some(now), later), later);
    }
}
