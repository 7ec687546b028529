//! Parsing of ECP query bodies.

use serde::Deserialize;

const MISSING: &str = "N/A";

/// An installed channel as reported by `/query/apps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub id: String,
    pub name: String,
}

/// Body of `/query/active-app`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveApp {
    pub app: Option<AppEntry>,
}

impl ActiveApp {
    pub fn label(&self) -> &str {
        match &self.app {
            Some(app) => &app.name,
            None => "No active app",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppXml {
    #[serde(rename = "@id", default)]
    id: Option<String>,
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

impl From<AppXml> for AppEntry {
    fn from(x: AppXml) -> Self {
        Self {
            id: non_empty(x.id),
            name: non_empty(x.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppsXml {
    #[serde(rename = "app", default)]
    apps: Vec<AppXml>,
}

#[derive(Debug, Deserialize)]
struct ActiveAppXml {
    #[serde(default)]
    app: Option<AppXml>,
}

/// Trimmed text; `N/A` when the attribute or text is absent or blank,
/// including an empty `<app/>`.
fn non_empty(v: Option<String>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => MISSING.to_string(),
    }
}

pub fn parse_active_app(body: &str) -> Result<ActiveApp, quick_xml::de::DeError> {
    let doc: ActiveAppXml = quick_xml::de::from_str(body)?;
    Ok(ActiveApp {
        app: doc.app.map(AppEntry::from),
    })
}

/// Parse `/query/apps`, sorted by name ignoring case.
pub fn parse_apps(body: &str) -> Result<Vec<AppEntry>, quick_xml::de::DeError> {
    let doc: AppsXml = quick_xml::de::from_str(body)?;
    let mut apps: Vec<AppEntry> = doc.apps.into_iter().map(AppEntry::from).collect();
    apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(apps)
}
