//! Query string builder.

use url::Url;

/// Builds a URL from a base and repeatable query parameters.
///
/// Keys keep their first-insertion order; repeated values for a key are
/// emitted as separate `key=value` pairs in the order they were added.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base: String,
    queries: Vec<(String, Vec<String>)>,
}

impl UrlBuilder {
    /// Start from `base`.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            queries: Vec::new(),
        }
    }

    /// Append a value for `key`. `None` is skipped.
    #[must_use]
    pub fn query<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        let Some(value) = value else {
            return self;
        };
        let value = value.to_string();
        match self.queries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.queries.push((key.to_string(), vec![value])),
        }
        self
    }

    /// Append every value in `values` for `key`.
    #[must_use]
    pub fn query_all<V: ToString>(self, key: &str, values: impl IntoIterator<Item = V>) -> Self {
        values
            .into_iter()
            .fold(self, |builder, value| builder.query(key, Some(value)))
    }

    /// Produce the final URL string.
    ///
    /// Without parameters, or if the base does not parse, the base is
    /// returned unchanged.
    #[must_use]
    pub fn build(&self) -> String {
        if self.queries.is_empty() {
            return self.base.clone();
        }
        let Ok(mut url) = Url::parse(&self.base) else {
            tracing::warn!(base = %self.base, "unparseable base URL, query dropped");
            return self.base.clone();
        };
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, values) in &self.queries {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_queries_returns_base_unchanged() {
        let url = UrlBuilder::new("https://api.example.com/v1/").build();
        assert_eq!(url, "https://api.example.com/v1/");
    }

    #[test]
    fn test_repeated_keys_keep_order() {
        let url = UrlBuilder::new("https://api.example.com/items")
            .query("tag", Some("b"))
            .query("page", Some(2))
            .query("tag", Some("a"))
            .build();
        assert_eq!(url, "https://api.example.com/items?tag=b&tag=a&page=2");
    }

    #[test]
    fn test_none_values_are_skipped() {
        let url = UrlBuilder::new("https://api.example.com/items")
            .query::<&str>("q", None)
            .build();
        assert_eq!(url, "https://api.example.com/items");
    }

    #[test]
    fn test_query_all_and_encoding() {
        let url = UrlBuilder::new("https://api.example.com/s")
            .query_all("id", [1, 2])
            .query("q", Some("a b&c"))
            .build();
        assert_eq!(url, "https://api.example.com/s?id=1&id=2&q=a+b%26c");
    }

    #[test]
    fn test_unparseable_base_is_returned() {
        let url = UrlBuilder::new("not a url").query("a", Some(1)).build();
        assert_eq!(url, "not a url");
    }
}
