//! Asset usage detection.

/// Decides whether compiled output refers to an asset.
pub trait AssetUsageDetector {
    /// `name` is the asset's file name, `content` the text just written.
    fn is_used(&self, name: &str, content: &str) -> bool;
}

/// Textual containment of the file name.
///
/// Cheap and deliberately loose: `a.png` also matches `banana.png`, and a
/// name mentioned in a comment counts as a reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringDetector;

impl AssetUsageDetector for SubstringDetector {
    #[inline]
    fn is_used(&self, name: &str, content: &str) -> bool {
        content.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_detector() {
        let detector = SubstringDetector;
        assert!(detector.is_used("logo.png", r#"<image src="/images/logo.png"/>"#));
        assert!(detector.is_used("a.png", "background: url(banana.png)"));
        assert!(!detector.is_used("logo.png", "<view>logo</view>"));
    }
}
