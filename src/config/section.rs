//! Configuration sections.
//!
//! # Example
//!
//! ```json
//! {
//!   "css": { "wxKey": "van-", "variable": { "$primary": "#07c160" } },
//!   "js": { "wxKey": "uni" },
//!   "limits": { "scriptTransform": 204800 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style rewrite rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CssConfig {
    /// Selector prefix to rewrite. Empty disables the rewrite.
    pub wx_key: String,
    /// Prefix substituted for `wx_key`.
    pub target_key: String,
    /// Whole-expression substitutions applied to declaration values.
    pub variable: BTreeMap<String, String>,
    /// Minify rewritten style sheets.
    pub minify: bool,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            wx_key: String::new(),
            target_key: "wx-".into(),
            variable: BTreeMap::new(),
            minify: false,
        }
    }
}

impl CssConfig {
    /// The `(source, target)` prefix pair, if the rewrite is enabled.
    pub fn prefix_rule(&self) -> Option<(&str, &str)> {
        (!self.wx_key.is_empty()).then_some((self.wx_key.as_str(), self.target_key.as_str()))
    }
}

/// Script rewrite rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsConfig {
    /// Identifier whose reads are rewritten. Empty disables the rewrite.
    pub wx_key: String,
    /// Replacement identifier.
    pub target: String,
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            wx_key: String::new(),
            target: "wx".into(),
        }
    }
}

impl JsConfig {
    /// The `(source, target)` identifier pair, if the rewrite is enabled.
    pub fn rename_rule(&self) -> Option<(&str, &str)> {
        (!self.wx_key.is_empty()).then_some((self.wx_key.as_str(), self.target.as_str()))
    }
}

/// Size thresholds, all in bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Scripts larger than this are copied verbatim.
    pub script_transform: u64,
    /// Files larger than this are written with a warning.
    pub file_warn: u64,
    /// Referenced assets larger than this are rejected.
    pub asset: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            script_transform: 200 * 1024,
            file_warn: 1024 * 1024,
            asset: 200 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_rule_disabled_by_default() {
        let css = CssConfig::default();
        assert!(css.prefix_rule().is_none());
        assert_eq!(css.target_key, "wx-");
    }

    #[test]
    fn test_css_camel_case_keys() {
        let css: CssConfig =
            serde_json::from_str(r#"{"wxKey": "van-", "variable": {"$c": "red"}}"#).unwrap();
        assert_eq!(css.prefix_rule(), Some(("van-", "wx-")));
        assert_eq!(css.variable.get("$c").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_js_rule() {
        let js: JsConfig = serde_json::from_str(r#"{"wxKey": "uni"}"#).unwrap();
        assert_eq!(js.rename_rule(), Some(("uni", "wx")));
    }

    #[test]
    fn test_limits_partial_override() {
        let limits: LimitsConfig = serde_json::from_str(r#"{"asset": 10}"#).unwrap();
        assert_eq!(limits.asset, 10);
        assert_eq!(limits.script_transform, 200 * 1024);
    }
}
