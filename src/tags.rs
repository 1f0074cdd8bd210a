use indexmap::IndexMap;

/// Tag key/value pairs kept in first-insertion order.
///
/// Re-setting an existing key updates its value in place; removing a key
/// closes the gap so the remaining pairs keep their relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pairs: IndexMap<String, String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.shift_remove(key);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_map(&self) -> IndexMap<String, String> {
        self.pairs.clone()
    }

    /// Appends `k1=v1{sep}k2=v2...` to `out`.
    pub fn write_pairs(&self, out: &mut String, sep: char) {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
    }

    /// Query filter block, `{k1=v1,k2=v2}`; nothing at all when empty.
    pub fn write_filter(&self, out: &mut String) {
        if self.is_empty() {
            return;
        }
        out.push('{');
        self.write_pairs(out, ',');
        out.push('}');
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for (k, v) in iter {
            tags.insert(k, v);
        }
        tags
    }
}
