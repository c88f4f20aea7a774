use serde::Deserialize;
use std::fmt;

/// Default number of download workers
pub const DEFAULT_WORKERS: usize = 3;

/// One entry of the rule file: a start page and the actions to run on it
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    /// Label used in log output
    #[serde(alias = "Name")]
    pub name: String,

    /// Start URL
    #[serde(alias = "URL", alias = "Url")]
    pub url: String,

    /// Bail-out threshold for already seen downloads (0 or negative = unlimited)
    #[serde(default, alias = "Bail")]
    pub bail: i64,

    /// Destination directory for downloads
    #[serde(alias = "Path")]
    pub path: String,

    /// Root action
    #[serde(default, rename = "do", alias = "Do")]
    pub action: Option<Action>,
}

impl Target {
    /// Bail-out threshold as used at run time, 0 meaning unlimited
    pub fn bail_limit(&self) -> u32 {
        if self.bail > 0 {
            u32::try_from(self.bail).unwrap_or(u32::MAX)
        } else {
            0
        }
    }
}

/// A node of the action tree
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    /// Query expression evaluated against the current page
    #[serde(alias = "xpath", alias = "XPath")]
    pub query: String,

    /// How the query results are traversed
    #[serde(alias = "Mode")]
    pub mode: Mode,

    /// What is done with every resolved result
    #[serde(rename = "action", alias = "Action")]
    pub kind: ActionKind,

    /// Nested action
    #[serde(default, rename = "do", alias = "Do")]
    pub next: Option<Box<Action>>,
}

impl Action {
    /// Creates a leaf action
    pub fn new(query: impl Into<String>, mode: Mode, kind: ActionKind) -> Self {
        Self {
            query: query.into(),
            mode,
            kind,
            next: None,
        }
    }

    /// Attaches a nested action
    pub fn then(mut self, next: Action) -> Self {
        self.next = Some(Box::new(next));
        self
    }
}

/// Traversal mode of an action
///
/// Unrecognized names are kept so that the affected target fails when it
/// runs instead of rejecting the whole rule file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Mode {
    /// Take the first result and walk it like a "next page" link
    Follow,
    /// Handle every result in document order
    Every,
    Unknown(String),
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "follow" => Mode::Follow,
            "every" => Mode::Every,
            _ => Mode::Unknown(value),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Follow => write!(f, "follow"),
            Mode::Every => write!(f, "every"),
            Mode::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// Effect applied to each query result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ActionKind {
    /// Print the extracted text as-is, without URL resolution
    Raw,
    /// Print the resolved URL
    Print,
    /// Log the resolved URL
    Log,
    /// Queue the resolved URL for download
    Download,
    /// Resolve only
    Noop,
    Unknown(String),
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "raw" => ActionKind::Raw,
            "print" => ActionKind::Print,
            "log" => ActionKind::Log,
            "download" => ActionKind::Download,
            "none" => ActionKind::Noop,
            _ => ActionKind::Unknown(value),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Raw => write!(f, "raw"),
            ActionKind::Print => write!(f, "print"),
            ActionKind::Log => write!(f, "log"),
            ActionKind::Download => write!(f, "download"),
            ActionKind::Noop => write!(f, "none"),
            ActionKind::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// TOML layout of a rule file: a list of `[[target]]` tables
#[derive(Debug, Deserialize)]
pub(crate) struct RulesFile {
    #[serde(default, rename = "target")]
    pub targets: Vec<Target>,
}

/// Run options, set from the command line
#[derive(Debug, Clone)]
pub struct GrabberConfig {
    /// Number of download workers (and download queue capacity)
    pub workers: usize,

    /// Maximum number of pages walked by one follow chain (0 = unlimited)
    pub max_follow: usize,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for GrabberConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_follow: 0,
            accept_invalid_certs: false,
            user_agent: format!("grabber/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
