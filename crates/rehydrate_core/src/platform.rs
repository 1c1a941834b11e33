//! Execution context flag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the current code is executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Server-side rendering.
    Server,
    /// Client-side execution after the page has loaded.
    Browser,
}

impl Platform {
    pub fn is_server(self) -> bool {
        matches!(self, Platform::Server)
    }

    pub fn is_browser(self) -> bool {
        matches!(self, Platform::Browser)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Server => f.write_str("server"),
            Platform::Browser => f.write_str("browser"),
        }
    }
}
