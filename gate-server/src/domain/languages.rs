//! Spoken-language tag list.

use std::fmt;

/// Languages a traveler speaks.
///
/// Stored remotely as a single comma-separated string. Parsing trims each
/// entry and drops empty ones; rendering joins with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Languages(Vec<String>);

impl Languages {
    /// Parse a comma-separated tag list.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive membership check.
    pub fn contains(&self, language: &str) -> bool {
        self.0.iter().any(|tag| tag.eq_ignore_ascii_case(language))
    }
}

impl fmt::Display for Languages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for Languages {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_drops_empty() {
        let langs = Languages::parse(" English,Italian , ,Spanish,");
        assert_eq!(langs.as_slice(), ["English", "Italian", "Spanish"]);
    }

    #[test]
    fn empty_string_is_empty_list() {
        assert!(Languages::parse("").is_empty());
        assert!(Languages::parse(" , ").is_empty());
    }

    #[test]
    fn display_joins_with_comma_space() {
        let langs: Languages = ["French", "German"].into_iter().collect();
        assert_eq!(langs.to_string(), "French, German");
        assert_eq!(Languages::parse(&langs.to_string()), langs);
    }

    #[test]
    fn contains_ignores_case() {
        let langs = Languages::parse("Portuguese, Japanese");
        assert!(langs.contains("japanese"));
        assert!(!langs.contains("Arabic"));
    }
}
