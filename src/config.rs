use serde::{Deserialize, Serialize};

/// Options recognized by [`LogRoller::open`](crate::LogRoller::open).
///
/// All fields have defaults, and `#[serde(default)]` lets partial documents
/// overlay them, so an empty config is valid:
///
/// ```
/// use logroll::Config;
///
/// let config: Config = serde_json::from_str("{}").unwrap();
/// assert_eq!(config.path, "out.log");
/// assert_eq!(config.symlink, None);
/// assert!(!config.compress);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path template for the active file. `%`-tokens substitute date/time
    /// fields at every rotation check; see [`PathTemplate`](crate::PathTemplate)
    /// for the token table. Relative paths are joined onto the working
    /// directory captured when the roller opens.
    pub path: String,

    /// Fixed path of a symlink kept pointing at the active file, or `None`
    /// to disable it. Never template-substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symlink: Option<String>,

    /// Gzip retired files in the background and remove the originals on
    /// success.
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            path: "out.log".to_string(),
            symlink: None,
            compress: false,
        }
    }
}
