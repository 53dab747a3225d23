use serde::Deserialize;

/// Locations of the HTML templates and static assets.
#[derive(Debug, Deserialize)]
pub struct UiConfig {
    /// Directory holding `base.html`, `partials/` and `pages/`.
    #[serde(default = "default_templates_path")]
    pub templates_path: String,
    /// Directory served under `/static/`.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            templates_path: default_templates_path(),
            static_path: default_static_path(),
        }
    }
}

fn default_templates_path() -> String {
    "ui/html".to_owned()
}

fn default_static_path() -> String {
    "ui/static".to_owned()
}
