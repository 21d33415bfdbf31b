use regex::{Regex, RegexBuilder};

use crate::{Error, Result};

/// Name patterns that keep repositories out of the gallery
///
/// `*` matches any run of characters; everything else is literal. Patterns
/// are anchored to the whole name and ignore case, so `dot*` hides
/// `Dotfiles` but not `my-dotfiles`.
#[derive(Debug, Clone, Default)]
pub struct ExcludeList {
    patterns: Vec<Regex>,
}

impl ExcludeList {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::ConfigError(format!("Invalid exclude pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards_are_anchored() {
        let list = ExcludeList::new(&["dot*", "*-archive", "exact"]).unwrap();

        assert!(list.is_excluded("dotfiles"));
        assert!(list.is_excluded("Dotfiles"));
        assert!(list.is_excluded("old-ARCHIVE"));
        assert!(list.is_excluded("EXACT"));

        assert!(!list.is_excluded("my-dotfiles"));
        assert!(!list.is_excluded("archive-old"));
        assert!(!list.is_excluded("exactly"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let list = ExcludeList::new(&["my.site", "a+b*"]).unwrap();
        assert!(list.is_excluded("my.site"));
        assert!(!list.is_excluded("myxsite"));
        assert!(list.is_excluded("a+b-extra"));
        assert!(!list.is_excluded("aab"));
    }

    #[test]
    fn test_blank_patterns_are_ignored() {
        let list = ExcludeList::new(&["", "   "]).unwrap();
        assert!(list.is_empty());
        assert!(!list.is_excluded("anything"));
    }

    #[test]
    fn test_star_alone_hides_everything() {
        let list = ExcludeList::new(&["*"]).unwrap();
        assert!(list.is_excluded("folio"));
        assert!(list.is_excluded(""));
    }
}
