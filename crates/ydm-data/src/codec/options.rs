use serde::{Deserialize, Serialize};

/// Settings for [`encode`](super::encode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Qualify member names with their module where RFC 7951 requires it.
    pub append_module_name: bool,
    /// Pretty-print with this indent string; compact output when `None`.
    pub indent: Option<String>,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module_names(mut self, on: bool) -> Self {
        self.append_module_name = on;
        self
    }

    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = Some(indent.to_string());
        self
    }
}

/// Settings for [`decode`](super::decode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Skip members with no schema node instead of failing.
    pub lenient: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient(mut self, on: bool) -> Self {
        self.lenient = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_load_from_config() {
        let opts: EncodeOptions =
            serde_json::from_str(r#"{"append_module_name": true, "indent": "  "}"#).unwrap();
        assert_eq!(opts, EncodeOptions::new().module_names(true).indent("  "));
        let opts: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.lenient);
    }
}
