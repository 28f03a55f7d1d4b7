//! Ordered URL query parameters with `URLSearchParams`-like editing.

use std::fmt;

use url::form_urlencoded;

/// Query-string pairs in their original order.
///
/// Parameters the list views do not own are kept untouched so a page can
/// write its own state back without dropping anything else in the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=2`, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first `key` in place and drop any repeats, or append.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Set a non-empty value, remove the key otherwise.
    pub fn set_or_remove(&mut self, key: &str, value: Option<&str>) {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.set(key, v),
            None => self.remove(key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Form-urlencoded string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_question_mark_and_decodes() {
        let params = QueryParams::parse("?filterValue=ann+lee&page=2&x=%25");
        assert_eq!(params.get("filterValue"), Some("ann lee"));
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("x"), Some("%"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn set_replaces_in_place_and_drops_duplicates() {
        let mut params = QueryParams::parse("a=1&page=1&b=2&page=7");
        params.set("page", "3");
        assert_eq!(params.to_query_string(), "a=1&page=3&b=2");
    }

    #[test]
    fn set_appends_new_keys() {
        let mut params = QueryParams::parse("a=1");
        params.set("sortField", "id");
        assert_eq!(params.to_query_string(), "a=1&sortField=id");
    }

    #[test]
    fn set_or_remove_deletes_on_empty() {
        let mut params = QueryParams::parse("filterValue=x&page=2");
        params.set_or_remove("filterValue", Some(""));
        params.set_or_remove("page", None);
        assert!(params.is_empty());
    }

    #[test]
    fn query_string_round_trips_special_characters() {
        let mut params = QueryParams::new();
        params.set("filterValue", "a&b=c %");
        let reparsed = QueryParams::parse(&params.to_query_string());
        assert_eq!(reparsed.get("filterValue"), Some("a&b=c %"));
    }
}
