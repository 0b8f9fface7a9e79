//! Version information for washroom.

/// Washroom version from Cargo.toml
pub const WASHROOM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version information embedded in every report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VersionInfo {
    /// Crate version.
    pub washroom: &'static str,
    /// Name of the binary that produced the report (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            washroom: WASHROOM_VERSION,
            binary: None,
        }
    }
}

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: String) -> Self {
        self.binary = Some(binary);
        self
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.binary {
            Some(binary) => write!(f, "{binary} {}", self.washroom),
            None => write!(f, "washroom {}", self.washroom),
        }
    }
}
