//! File templates for a generated project.
//!
//! Everything here is a pure function of [`TemplateContext`]; writing the
//! results is the pipeline's job.

use {
    chrono::{DateTime, Datelike, SecondsFormat, Utc},
    microlab_config::{Addon, FeatureSet},
    serde::Serialize,
};

use crate::{
    error::{Context, Result},
    identity::ProjectIdentity,
    markup::{AttrMatch, Injection, InsertionPoint, Marker, escape},
    urls::ProjectUrls,
};

pub const LAB_VERSION: &str = "0.1.0";
pub const THEME_COLOR: &str = "#0a0a0b";

/// Everything a template may refer to.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub identity: &'a ProjectIdentity,
    pub desc: &'a str,
    pub urls: &'a ProjectUrls,
    pub features: &'a FeatureSet,
    pub author: &'a str,
    pub now: DateTime<Utc>,
}

/// A file to write, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub path: &'static str,
    pub contents: String,
}

impl StaticFile {
    fn new(path: &'static str, contents: impl Into<String>) -> Self {
        Self {
            path,
            contents: contents.into(),
        }
    }
}

/// The files every project gets, in write order. `tsconfig.json` is not
/// included; see [`tsconfig`].
pub fn project_files(ctx: &TemplateContext<'_>) -> Result<Vec<StaticFile>> {
    let mut files = vec![
        StaticFile::new(".gitignore", GITIGNORE),
        StaticFile::new("postcss.config.cjs", POSTCSS_CONFIG),
        StaticFile::new("tailwind.config.cjs", tailwind_config(ctx.features.plugins_enabled())),
        StaticFile::new("vite.config.ts", VITE_CONFIG),
        StaticFile::new("src/style.css", STYLE_CSS),
        StaticFile::new("lab.json", lab_json(ctx)?),
        StaticFile::new("thumbnail.svg", thumbnail(&ctx.identity.raw_name)),
        StaticFile::new(".github/workflows/pages.yml", PAGES_WORKFLOW),
        StaticFile::new(".prettierrc", PRETTIERRC),
        StaticFile::new(".editorconfig", EDITORCONFIG),
        StaticFile::new("README.md", readme(ctx)),
        StaticFile::new("COMMANDS.md", commands(ctx)),
        StaticFile::new("TEMPLATE_CHECKLIST.md", checklist(ctx)),
        StaticFile::new("LICENSE", license(ctx.now.year(), ctx.author)),
    ];
    if ctx.features.has(Addon::Pwa) {
        files.push(StaticFile::new("manifest.webmanifest", web_manifest(ctx)?));
    }
    Ok(files)
}

// ── Markup ──────────────────────────────────────────────────────────────────

pub const VIEWPORT: Marker = Marker {
    name: "viewport",
    tag: "meta",
    attr: "name",
    value: AttrMatch::Exact("viewport"),
};
pub const DESCRIPTION: Marker = Marker {
    name: "description",
    tag: "meta",
    attr: "name",
    value: AttrMatch::Exact("description"),
};
pub const THEME: Marker = Marker {
    name: "theme-color",
    tag: "meta",
    attr: "name",
    value: AttrMatch::Exact("theme-color"),
};
pub const CANONICAL: Marker = Marker {
    name: "canonical",
    tag: "link",
    attr: "rel",
    value: AttrMatch::Exact("canonical"),
};
pub const ICON: Marker = Marker {
    name: "icon",
    tag: "link",
    attr: "href",
    value: AttrMatch::Suffix("thumbnail.svg"),
};
pub const STYLESHEET: Marker = Marker {
    name: "stylesheet",
    tag: "link",
    attr: "href",
    value: AttrMatch::Suffix("src/style.css"),
};
pub const APP_ROOT: Marker = Marker {
    name: "app-root",
    tag: "div",
    attr: "id",
    value: AttrMatch::Exact("app"),
};
pub const ENTRY_SCRIPT: Marker = Marker {
    name: "entry-script",
    tag: "script",
    attr: "src",
    value: AttrMatch::Suffix("src/main.ts"),
};
pub const MANIFEST_LINK: Marker = Marker {
    name: "manifest",
    tag: "link",
    attr: "rel",
    value: AttrMatch::Exact("manifest"),
};

fn inject(marker: Marker, point: InsertionPoint, snippet: String) -> Injection {
    Injection {
        marker,
        point,
        snippet,
    }
}

/// Edits applied to the scaffolded `index.html`, in order.
pub fn markup_injections(ctx: &TemplateContext<'_>) -> Vec<Injection> {
    use InsertionPoint::*;

    let mut edits = vec![
        inject(
            VIEWPORT,
            HeadStart,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#.into(),
        ),
        inject(
            DESCRIPTION,
            HeadEnd,
            format!(r#"<meta name="description" content="{}">"#, escape(ctx.desc)),
        ),
        inject(
            THEME,
            HeadEnd,
            format!(r#"<meta name="theme-color" content="{THEME_COLOR}">"#),
        ),
        inject(
            CANONICAL,
            HeadEnd,
            format!(
                r#"<link rel="canonical" href="{}">"#,
                escape(&ctx.urls.canonical())
            ),
        ),
        inject(ICON, HeadEnd, r#"<link rel="icon" href="./thumbnail.svg">"#.into()),
        inject(
            STYLESHEET,
            HeadEnd,
            r#"<link rel="stylesheet" href="./src/style.css">"#.into(),
        ),
    ];

    if ctx.features.has(Addon::Pwa) {
        edits.push(inject(
            MANIFEST_LINK,
            HeadEnd,
            r#"<link rel="manifest" href="./manifest.webmanifest">"#.into(),
        ));
    }

    if !ctx.features.template().is_react() {
        edits.push(inject(APP_ROOT, BodyStart, r#"<div id="app"></div>"#.into()));
        edits.push(inject(
            ENTRY_SCRIPT,
            BodyEnd,
            r#"<script type="module" src="./src/main.ts"></script>"#.into(),
        ));
    }
    edits
}

// ── Build configuration ────────────────────────────────────────────────────

const GITIGNORE: &str = "node_modules\ndist\n.DS_Store\n";

const POSTCSS_CONFIG: &str =
    "module.exports = { plugins: { tailwindcss: {}, autoprefixer: {} } };\n";

const VITE_CONFIG: &str = r#"import { defineConfig } from "vite";
export default defineConfig({ base: "./", build: { outDir: "dist" } });
"#;

/// Style plugins registered unless plugins are disabled.
pub const STYLE_PLUGINS: [&str; 3] = [
    "@tailwindcss/typography",
    "@tailwindcss/forms",
    "@tailwindcss/aspect-ratio",
];

pub fn tailwind_config(plugins_enabled: bool) -> String {
    let plugins = if plugins_enabled {
        STYLE_PLUGINS
            .iter()
            .map(|p| format!("    require(\"{p}\"),\n"))
            .collect::<String>()
    } else {
        String::new()
    };
    format!(
        r#"/** @type {{import('tailwindcss').Config}} */
module.exports = {{
  content: ["./index.html", "./src/**/*.{{ts,tsx,js,jsx}}"],
  theme: {{
    extend: {{
      colors: {{ bg: "rgb(10 10 11)", fg: "rgb(235 235 235)", muted: "rgb(160 160 160)" }},
    }},
  }},
  plugins: [
{plugins}  ],
}};
"#
    )
}

const STYLE_CSS: &str = r#"@tailwind base;
@tailwind components;
@tailwind utilities;

/* Tokens */
:root { --bg: rgb(10 10 11); --fg: rgb(235 235 235); --muted: rgb(160 160 160); color-scheme: dark; }
html, body { height: 100%; }
body { @apply bg-[color:var(--bg)] text-[color:var(--fg)] antialiased; }

/* Primitives */
.container { @apply max-w-3xl mx-auto p-6; }
.btn { @apply inline-flex items-center gap-2 px-3 py-2 rounded border border-white/20 hover:bg-white/10; }
.card { @apply rounded-lg border border-white/10 p-4 bg-white/5; }
.muted { color: var(--muted); }
"#;

const PAGES_WORKFLOW: &str = r#"name: Deploy to GitHub Pages
on:
  push:
    branches: [ main ]
permissions:
  contents: read
  pages: write
  id-token: write
concurrency:
  group: "pages"
  cancel-in-progress: true
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-node@v4
        with: { node-version: 20, cache: npm }
      - run: npm ci
      - run: npm run build
      - uses: actions/upload-pages-artifact@v3
        with: { path: ./dist }
  deploy:
    needs: build
    runs-on: ubuntu-latest
    environment:
      name: github-pages
      url: ${{ steps.deployment.outputs.page_url }}
    steps:
      - id: deployment
        uses: actions/deploy-pages@v4
"#;

const PRETTIERRC: &str = r#"{
  "semi": true,
  "singleQuote": false,
  "printWidth": 100
}
"#;

const EDITORCONFIG: &str = "root = true
[*]
charset = utf-8
end_of_line = lf
indent_style = space
indent_size = 2
insert_final_newline = true
";

/// Written only when the scaffolder did not produce one.
pub const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2020",
    "module": "ESNext",
    "moduleResolution": "Bundler",
    "strict": true,
    "skipLibCheck": true,
    "esModuleInterop": true,
    "jsx": "react-jsx"
  },
  "include": ["src"]
}
"#;

// ── Metadata ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LabMetadata<'a> {
    slug: &'a str,
    title: &'a str,
    summary: &'a str,
    version: &'static str,
    author: &'a str,
    tags: [&'static str; 0],
    thumbnail: &'static str,
    entry: &'static str,
    repo: &'a str,
    updated: String,
}

pub fn lab_json(ctx: &TemplateContext<'_>) -> Result<String> {
    let meta = LabMetadata {
        slug: &ctx.identity.slug,
        title: &ctx.identity.raw_name,
        summary: ctx.desc,
        version: LAB_VERSION,
        author: ctx.author,
        tags: [],
        thumbnail: "./thumbnail.svg",
        entry: "./index.html",
        repo: &ctx.urls.repo,
        updated: ctx.now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    to_pretty_json(&meta)
}

#[derive(Serialize)]
struct WebManifest<'a> {
    name: &'a str,
    short_name: &'a str,
    description: &'a str,
    start_url: &'static str,
    display: &'static str,
    background_color: &'static str,
    theme_color: &'static str,
    icons: [ManifestIcon; 1],
}

#[derive(Serialize)]
struct ManifestIcon {
    src: &'static str,
    sizes: &'static str,
    #[serde(rename = "type")]
    mime: &'static str,
}

pub fn web_manifest(ctx: &TemplateContext<'_>) -> Result<String> {
    let manifest = WebManifest {
        name: &ctx.identity.raw_name,
        short_name: &ctx.identity.slug,
        description: ctx.desc,
        start_url: ".",
        display: "standalone",
        background_color: THEME_COLOR,
        theme_color: THEME_COLOR,
        icons: [ManifestIcon {
            src: "./thumbnail.svg",
            sizes: "512x512",
            mime: "image/svg+xml",
        }],
    };
    to_pretty_json(&manifest)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
    text.push('\n');
    Ok(text)
}

pub fn thumbnail(title: &str) -> String {
    let title = escape(title);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630">
  <rect width="100%" height="100%" fill="#0a0a0b"/>
  <text x="50%" y="50%" fill="#e7e7e7" font-family="system-ui, Arial" font-size="54" text-anchor="middle" dominant-baseline="middle">{title}</text>
</svg>
"##
    )
}

// ── Documentation ──────────────────────────────────────────────────────────

fn readme(ctx: &TemplateContext<'_>) -> String {
    let name = &ctx.identity.raw_name;
    let slug = &ctx.identity.slug;
    let ProjectUrls {
        owner, pages, proxy, ..
    } = ctx.urls;
    format!(
        r#"# {name}

Tiny micro-site built with Vite + Tailwind.

- Live: {pages}/
- Proxy: {proxy}/

## Scripts
- npm run dev
- npm run build
- npm run preview

## GitHub
gh repo create {owner}/{slug} --public --source=. --push

## Next.js rewrites (paste into your main site's next.config.ts)
{{
  source: "/labs/{slug}",
  destination: "{pages}/index.html"
}},
{{
  source: "/labs/{slug}/:path*",
  destination: "{pages}/:path*"
}}

## Labs registry row (add to config/labs.json in your main site)
{{ "slug": "{slug}", "base": "{pages}" }}
"#
    )
}

fn commands(ctx: &TemplateContext<'_>) -> String {
    let slug = &ctx.identity.slug;
    let ProjectUrls {
        owner, pages, proxy, ..
    } = ctx.urls;
    format!(
        r#"# Commands ({slug})

## Dev and build
npm run dev
npm run build
npm run preview

## Init and push
git init -b main
git add -A && git commit -m "init"
gh repo create {owner}/{slug} --public --source=. --push

## URLs
Pages: {pages}/
Proxy: {proxy}/

## Rewrites (Next.js)
- "/labs/{slug}" -> "{pages}/index.html"
- "/labs/{slug}/:path*" -> "{pages}/:path*"

## Health checks
curl -I {pages}/lab.json
curl -I {proxy}/lab.json
"#
    )
}

fn checklist(ctx: &TemplateContext<'_>) -> String {
    let slug = &ctx.identity.slug;
    let ProjectUrls {
        pages, proxy, repo, ..
    } = ctx.urls;
    format!(
        r#"# Checklist: {slug}

- [ ] vite.config.ts has base "./"
- [ ] dist/404.html exists
- [ ] dist/lab.json and dist/thumbnail.svg present
- [ ] Canonical link href="{proxy}/" present
- [ ] lab.json has "slug": "{slug}" and "repo": "{repo}"
- [ ] .github/workflows/pages.yml exists
- [ ] Live: {pages}/
- [ ] Proxy: {proxy}/
- [ ] Rewrites added to main site
"#
    )
}

pub fn license(year: i32, holder: &str) -> String {
    format!(
        r#"MIT License

Copyright (c) {year} {holder}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files, to deal in the Software
without restriction, including without limitation the rights to use, copy,
modify, merge, publish, distribute, sublicense, and/or sell copies of the
Software, and to permit persons to whom the Software is furnished to do so,
subject to the following conditions:

The above copyright notice and this permission notice shall be included in
all copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
THE SOFTWARE.
"#
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        chrono::TimeZone,
        microlab_config::{FeatureFlags, MicrolabConfig},
    };

    fn features(flags: FeatureFlags) -> FeatureSet {
        FeatureSet::resolve(&flags, &MicrolabConfig::default())
    }

    fn with_ctx<R>(features: &FeatureSet, f: impl FnOnce(&TemplateContext<'_>) -> R) -> R {
        let identity = ProjectIdentity::resolve("3d Cube").unwrap();
        let urls = ProjectUrls::new(Some("octocat"), &identity.slug, "https://velcrafting.com/labs");
        let ctx = TemplateContext {
            identity: &identity,
            desc: "Tiny demo 3d-cube",
            urls: &urls,
            features,
            author: "Octo Cat",
            now: Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap(),
        };
        f(&ctx)
    }

    #[test]
    fn tailwind_plugins_follow_flag() {
        let on = tailwind_config(true);
        let off = tailwind_config(false);
        for plugin in STYLE_PLUGINS {
            assert!(on.contains(plugin));
            assert!(!off.contains(plugin));
        }
        assert!(off.contains("plugins: [\n  ],"));
        assert!(off.contains(r#"content: ["./index.html", "./src/**/*.{ts,tsx,js,jsx}"]"#));
    }

    #[test]
    fn lab_json_has_fixed_shape() {
        let set = features(FeatureFlags::default());
        let text = with_ctx(&set, |ctx| lab_json(ctx).unwrap());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["slug"], "3d-cube");
        assert_eq!(value["title"], "3d Cube");
        assert_eq!(value["summary"], "Tiny demo 3d-cube");
        assert_eq!(value["version"], "0.1.0");
        assert_eq!(value["tags"], serde_json::json!([]));
        assert_eq!(value["repo"], "https://github.com/octocat/3d-cube");
        assert_eq!(value["updated"], "2025-06-01T08:30:00.000Z");
        assert!(text.find("\"slug\"").unwrap() < text.find("\"updated\"").unwrap());
    }

    #[test]
    fn pwa_adds_manifest_file() {
        let plain = features(FeatureFlags::default());
        let pwa = features(FeatureFlags {
            pwa: true,
            ..Default::default()
        });

        let files = with_ctx(&plain, |ctx| project_files(ctx).unwrap());
        assert!(files.iter().all(|f| f.path != "manifest.webmanifest"));

        let files = with_ctx(&pwa, |ctx| project_files(ctx).unwrap());
        let manifest = files
            .iter()
            .find(|f| f.path == "manifest.webmanifest")
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&manifest.contents).unwrap();
        assert_eq!(value["start_url"], ".");
        assert_eq!(value["short_name"], "3d-cube");
        assert_eq!(value["icons"][0]["type"], "image/svg+xml");
    }

    #[test]
    fn docs_reference_project_urls() {
        let set = features(FeatureFlags::default());
        let files = with_ctx(&set, |ctx| project_files(ctx).unwrap());
        let get = |path: &str| &files.iter().find(|f| f.path == path).unwrap().contents;

        assert!(get("README.md").starts_with("# 3d Cube\n"));
        assert!(get("README.md").contains("- Live: https://octocat.github.io/3d-cube/"));
        assert!(get("COMMANDS.md").contains("gh repo create octocat/3d-cube --public"));
        assert!(get("TEMPLATE_CHECKLIST.md").contains("https://velcrafting.com/labs/3d-cube/"));
        assert!(get("LICENSE").contains("Copyright (c) 2025 Octo Cat"));
        assert!(get(".github/workflows/pages.yml").contains("${{ steps.deployment.outputs.page_url }}"));
    }

    #[test]
    fn vanilla_markup_includes_app_root_and_script() {
        let set = features(FeatureFlags::default());
        let names: Vec<_> = with_ctx(&set, |ctx| markup_injections(ctx))
            .into_iter()
            .map(|i| i.marker.name)
            .collect();
        assert!(names.contains(&"app-root"));
        assert!(names.contains(&"entry-script"));
        assert!(!names.contains(&"manifest"));
    }

    #[test]
    fn react_markup_leaves_body_alone() {
        let set = features(FeatureFlags {
            template: Some("react".into()),
            pwa: true,
            ..Default::default()
        });
        let edits = with_ctx(&set, |ctx| markup_injections(ctx));
        assert!(edits.iter().all(|i| matches!(
            i.point,
            InsertionPoint::HeadStart | InsertionPoint::HeadEnd
        )));
        assert!(edits.iter().any(|i| i.marker == MANIFEST_LINK));
    }

    #[test]
    fn padded_names_appear_trimmed_in_every_file() {
        let set = features(FeatureFlags {
            pwa: true,
            ..Default::default()
        });
        let identity = ProjectIdentity::resolve("   Orbit Lab \t").unwrap();
        let urls = ProjectUrls::new(None, &identity.slug, "https://example.com");
        let ctx = TemplateContext {
            identity: &identity,
            desc: "Tiny demo orbit-lab",
            urls: &urls,
            features: &set,
            author: "me",
            now: Utc::now(),
        };
        let files = project_files(&ctx).unwrap();
        let get = |path: &str| &files.iter().find(|f| f.path == path).unwrap().contents;

        let lab: serde_json::Value = serde_json::from_str(get("lab.json")).unwrap();
        assert_eq!(lab["title"], "Orbit Lab");
        let manifest: serde_json::Value =
            serde_json::from_str(get("manifest.webmanifest")).unwrap();
        assert_eq!(manifest["name"], "Orbit Lab");
        assert!(get("README.md").starts_with("# Orbit Lab\n"));
        assert!(get("thumbnail.svg").contains(">Orbit Lab<"));
    }

    #[test]
    fn description_is_escaped_in_markup() {
        let set = features(FeatureFlags::default());
        let identity = ProjectIdentity::resolve("x").unwrap();
        let urls = ProjectUrls::new(None, "x", "https://example.com");
        let ctx = TemplateContext {
            identity: &identity,
            desc: r#"say "hi" & <wave>"#,
            urls: &urls,
            features: &set,
            author: "me",
            now: Utc::now(),
        };
        let desc = markup_injections(&ctx)
            .into_iter()
            .find(|i| i.marker == DESCRIPTION)
            .unwrap();
        assert_eq!(
            desc.snippet,
            r#"<meta name="description" content="say &quot;hi&quot; &amp; &lt;wave&gt;">"#
        );
    }
}
