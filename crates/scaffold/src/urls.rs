/// Placeholder used in generated text when no owner could be resolved.
pub const OWNER_PLACEHOLDER: &str = "<owner>";

/// The addresses a generated project is expected to be reachable at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectUrls {
    pub owner: String,
    /// GitHub Pages root, `https://<owner>.github.io/<slug>`.
    pub pages: String,
    /// Reverse-proxied path on the main site, `<proxy_base>/<slug>`.
    pub proxy: String,
    pub repo: String,
}

impl ProjectUrls {
    pub fn new(owner: Option<&str>, slug: &str, proxy_base: &str) -> Self {
        let owner = owner
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(OWNER_PLACEHOLDER)
            .to_string();
        Self {
            pages: format!("https://{owner}.github.io/{slug}"),
            proxy: format!("{}/{slug}", proxy_base.trim_end_matches('/')),
            repo: format!("https://github.com/{owner}/{slug}"),
            owner,
        }
    }

    /// Canonical link target, always with a trailing slash.
    pub fn canonical(&self) -> String {
        format!("{}/", self.proxy)
    }
}
