use {
    chrono::{DateTime, NaiveDate, Utc},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

const KNOWN_KEYS: [&str; 8] = [
    "slug", "title", "desc", "owner", "base", "proxy", "updated", "tags",
];

/// One generated project in a catalog, keyed by `slug`.
///
/// Field order is the on-disk key order. Optional fields may be absent in
/// hand-edited or older catalogs; unknown keys are kept and written back
/// after the known ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Pages URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Canonical reverse-proxied URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(
        default,
        with = "iso_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistryEntry {
    /// Title for display, falling back to the slug.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.slug)
    }

    /// Where a card should link: the proxy URL, else the pages URL.
    pub fn href(&self) -> Option<&str> {
        self.proxy.as_deref().or(self.base.as_deref())
    }

    /// Decode a catalog element without rejecting it over one odd field.
    ///
    /// Only a non-empty string `slug` is required. Known fields of the wrong
    /// type read as absent, non-string tags are dropped, and a date-only
    /// `updated` means midnight UTC. Returns `None` when there is no usable
    /// slug.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let slug = object
            .get("slug")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(String::from);

        let tags = match object.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        let extra: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self {
            slug: slug.to_string(),
            title: text("title"),
            desc: text("desc"),
            owner: text("owner"),
            base: text("base"),
            proxy: text("proxy"),
            updated: object
                .get("updated")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            tags,
            extra,
        })
    }
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `updated` is stored the way browsers print dates:
/// `2025-01-31T09:15:00.000Z`.
mod iso_millis {
    use {
        chrono::{DateTime, SecondsFormat, Utc},
        serde::{Deserialize, Deserializer, Serializer},
    };

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
