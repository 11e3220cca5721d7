use anyhow::Result;
use regex::Regex;
use std::borrow::Cow;

/// Closes worker documents that were cut off mid-stream.
///
/// Workers append records to an open array and only write the closing bracket
/// on clean shutdown, so an interrupted run leaves `[{...},{...},` behind.
#[derive(Debug, Clone)]
pub struct DocumentRepair {
    trailing_comma: Regex,
}

impl DocumentRepair {
    pub fn new() -> Result<Self> {
        Ok(Self {
            trailing_comma: Regex::new(r",(\s*[}\]])")?,
        })
    }

    /// Returns the input unchanged when nothing needed fixing.
    pub fn finalize<'a>(&self, content: &'a str) -> Cow<'a, str> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Cow::Borrowed("[]");
        }

        let mut fixed = if trimmed.ends_with(']') {
            Cow::Borrowed(trimmed)
        } else {
            let stripped = trimmed.strip_suffix(',').unwrap_or(trimmed).trim_end();
            Cow::Owned(format!("{}\n]", stripped))
        };

        if self.trailing_comma.is_match(&fixed) {
            fixed = Cow::Owned(self.trailing_comma.replace_all(&fixed, "$1").into_owned());
        }

        if fixed == content {
            Cow::Borrowed(content)
        } else {
            fixed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repair() -> DocumentRepair {
        DocumentRepair::new().unwrap()
    }

    #[test]
    fn empty_document_becomes_empty_array() {
        assert_eq!(repair().finalize(""), "[]");
        assert_eq!(repair().finalize("  \n"), "[]");
    }

    #[test]
    fn closes_unterminated_array() {
        let repaired = repair().finalize("[\n{\"url\":\"http://a.com\"},\n");
        let parsed: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn removes_inner_trailing_commas() {
        let repaired = repair().finalize("[{\"depth\":1,},{\"depth\":2},]");
        assert_eq!(repaired, "[{\"depth\":1},{\"depth\":2}]");
    }

    #[test]
    fn well_formed_document_is_borrowed() {
        let doc = "[{\"url\":\"http://a.com\"}]";
        assert!(matches!(repair().finalize(doc), Cow::Borrowed(s) if s == doc));
    }

    #[test]
    fn garbage_stays_unparsable() {
        let repaired = repair().finalize("not json");
        assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_err());
    }
}
