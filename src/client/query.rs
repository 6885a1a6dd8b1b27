//! Ordered query parameters.

/// Ordered multi-map of query parameters.
///
/// Names may repeat; insertion order is kept in the generated query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pairs: Vec<(String, String)>,
}

impl QueryParameters {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter list holding one pair.
    pub fn single(name: impl Into<String>, value: impl ToString) -> Self {
        Self::new().add(name, value)
    }

    /// Appends a parameter.
    pub fn add(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((name.into(), value.to_string()));
        self
    }

    /// Appends a parameter if the value is present.
    pub fn add_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.add(name, value),
            None => self,
        }
    }

    /// Appends one pair per value, all sharing the same name.
    pub fn add_all<I>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.pairs
            .extend(values.into_iter().map(|value| (name.to_string(), value.to_string())));
        self
    }

    /// Appends all pairs of another list.
    pub fn extend(mut self, other: QueryParameters) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true when there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(QueryParameters::new(), |params, (name, value)| params.add(name, value))
    }
}
