//! Types shared by rendering engines.

use serde::{Deserialize, Serialize};

/// Options passed to the engine's open call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOptions {
    /// Open the document even when the engine detects minor corruption.
    pub force_open: bool,
}

impl OpenOptions {
    /// The options the adapter always uses.
    pub fn forced() -> Self {
        Self { force_open: true }
    }

    /// Renders the options in the engine's `key:value` syntax.
    pub fn to_engine_string(&self) -> String {
        format!("forceopen:{}", self.force_open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_options() {
        let options = OpenOptions::forced();
        assert!(options.force_open);
        assert_eq!(options.to_engine_string(), "forceopen:true");
    }
}
