//! Utility modules shared across the compiler.

pub mod path;

/// `3 files`, `1 error`. Nouns in summaries all take a plain `s`.
pub fn counted(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted() {
        assert_eq!(counted(0, "file"), "0 files");
        assert_eq!(counted(1, "error"), "1 error");
        assert_eq!(counted(2, "static asset"), "2 static assets");
    }
}
