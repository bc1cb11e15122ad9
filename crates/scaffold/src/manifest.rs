//! Patching the scaffolder's `package.json`.
//!
//! Only the keys this tool owns are touched. Everything else, including key
//! order, is written back as it was read.

use std::path::Path;

use {
    serde_json::{Map, Value},
    tracing::debug,
};

use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "package.json";

const DEV_FLAGS: &str = " --strictPort --port 5173";
const DEV_MARKER: &str = "--strictPort";
const PREVIEW_SCRIPT: &str = "vite preview --strictPort --port 5173";
const KEYWORDS: [&str; 4] = ["micro", "labs", "vite", "tailwind"];

const POSTBUILD_STEPS: [&str; 3] = [
    "cp dist/index.html dist/404.html",
    "cp lab.json dist/lab.json",
    "cp thumbnail.svg dist/thumbnail.svg",
];
const PWA_POSTBUILD_STEP: &str = "cp manifest.webmanifest dist/manifest.webmanifest";

/// Applies the generator's fields to a package manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestPatcher {
    pub pwa: bool,
}

impl ManifestPatcher {
    pub fn new(pwa: bool) -> Self {
        Self { pwa }
    }

    /// Read, patch and rewrite `<project>/package.json`.
    pub fn patch_file(&self, project_dir: &Path) -> Result<()> {
        let path = project_dir.join(MANIFEST_FILE);
        let text = std::fs::read_to_string(&path).map_err(|e| Error::manifest(&path, e))?;
        let patched = self.patch_str(&text, &path)?;
        std::fs::write(&path, patched).map_err(|e| Error::io(&path, e))?;
        debug!(path = %path.display(), "patched package manifest");
        Ok(())
    }

    /// Patch manifest text. `path` is only used for error messages.
    pub fn patch_str(&self, text: &str, path: &Path) -> Result<String> {
        let mut doc: Value = serde_json::from_str(text).map_err(|e| Error::manifest(path, e))?;
        self.apply(&mut doc, path)?;
        let mut out = serde_json::to_string_pretty(&doc).map_err(|e| Error::manifest(path, e))?;
        out.push('\n');
        Ok(out)
    }

    pub fn apply(&self, doc: &mut Value, path: &Path) -> Result<()> {
        let Value::Object(root) = doc else {
            return Err(Error::manifest(path, "top level is not an object"));
        };

        let scripts = root
            .entry("scripts")
            .or_insert_with(|| Value::Object(Map::new()));
        if scripts.is_null() {
            *scripts = Value::Object(Map::new());
        }
        let Value::Object(scripts) = scripts else {
            return Err(Error::manifest(path, "\"scripts\" is not an object"));
        };

        // `dev` is extended only when present; `preview` is always replaced.
        if let Some(Value::String(dev)) = scripts.get_mut("dev")
            && !dev.contains(DEV_MARKER)
        {
            dev.push_str(DEV_FLAGS);
        }
        scripts.insert("preview".into(), PREVIEW_SCRIPT.into());
        scripts.insert("postbuild".into(), self.postbuild().into());

        let existing = match root.get("keywords") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(existing)) => existing.clone(),
            Some(_) => return Err(Error::manifest(path, "\"keywords\" is not an array")),
        };
        let mut keywords: Vec<Value> = Vec::with_capacity(existing.len() + KEYWORDS.len());
        for keyword in existing.into_iter().chain(KEYWORDS.map(Value::from)) {
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        root.insert("keywords".into(), Value::Array(keywords));
        Ok(())
    }

    pub fn postbuild(&self) -> String {
        let mut steps = POSTBUILD_STEPS.to_vec();
        if self.pwa {
            steps.push(PWA_POSTBUILD_STEP);
        }
        steps.join(" && ")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const VITE_PACKAGE: &str = r#"{
  "name": "viz",
  "private": true,
  "version": "0.0.0",
  "type": "module",
  "scripts": {
    "dev": "vite",
    "build": "tsc && vite build",
    "preview": "vite preview"
  },
  "devDependencies": {
    "typescript": "~5.6.2",
    "vite": "^6.0.0"
  }
}
"#;

    fn patch(pwa: bool, text: &str) -> Value {
        let out = ManifestPatcher::new(pwa)
            .patch_str(text, Path::new("package.json"))
            .unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[test]
    fn patches_scripts_and_keywords() {
        let doc = patch(false, VITE_PACKAGE);
        assert_eq!(doc["scripts"]["dev"], "vite --strictPort --port 5173");
        assert_eq!(doc["scripts"]["build"], "tsc && vite build");
        assert_eq!(doc["scripts"]["preview"], PREVIEW_SCRIPT);
        assert_eq!(
            doc["scripts"]["postbuild"],
            "cp dist/index.html dist/404.html && cp lab.json dist/lab.json && cp thumbnail.svg dist/thumbnail.svg"
        );
        assert_eq!(doc["keywords"], serde_json::json!(["micro", "labs", "vite", "tailwind"]));
        assert_eq!(doc["devDependencies"]["vite"], "^6.0.0");
    }

    #[test]
    fn pwa_adds_manifest_copy_step() {
        let doc = patch(true, VITE_PACKAGE);
        assert!(
            doc["scripts"]["postbuild"]
                .as_str()
                .unwrap()
                .ends_with(" && cp manifest.webmanifest dist/manifest.webmanifest")
        );
    }

    #[test]
    fn patching_twice_is_stable() {
        let patcher = ManifestPatcher::new(true);
        let once = patcher.patch_str(VITE_PACKAGE, Path::new("p")).unwrap();
        let twice = patcher.patch_str(&once, Path::new("p")).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn key_order_is_preserved() {
        let out = ManifestPatcher::new(false)
            .patch_str(VITE_PACKAGE, Path::new("p"))
            .unwrap();
        let pos = |k: &str| out.find(&format!("\"{k}\"")).unwrap();
        assert!(pos("name") < pos("private"));
        assert!(pos("type") < pos("scripts"));
        assert!(pos("scripts") < pos("devDependencies"));
        assert!(pos("devDependencies") < pos("keywords"));
    }

    #[test]
    fn existing_keywords_keep_first_occurrence_order() {
        let doc = patch(
            false,
            r#"{"keywords":["vite","demo","vite"],"scripts":{"dev":"vite --strictPort"}}"#,
        );
        assert_eq!(
            doc["keywords"],
            serde_json::json!(["vite", "demo", "micro", "labs", "tailwind"])
        );
        assert_eq!(doc["scripts"]["dev"], "vite --strictPort");
    }

    #[test]
    fn missing_scripts_section_is_created_without_dev() {
        let doc = patch(false, r#"{"name":"x"}"#);
        assert!(doc["scripts"].get("dev").is_none());
        assert_eq!(doc["scripts"]["preview"], PREVIEW_SCRIPT);
    }

    #[test]
    fn invalid_documents_are_manifest_errors() {
        let patcher = ManifestPatcher::default();
        for bad in ["{not json", "[1, 2]", r#"{"scripts": 3}"#, r#"{"keywords": "x"}"#] {
            let err = patcher.patch_str(bad, Path::new("package.json")).unwrap_err();
            assert!(matches!(err, Error::ManifestParse { .. }), "{bad}");
        }
    }

    #[test]
    fn missing_file_is_a_manifest_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManifestPatcher::default().patch_file(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }
}
