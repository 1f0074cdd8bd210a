/// TSUIDs held in their comma-joined wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsuidList(String);

impl TsuidList {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A freshly split list.
    pub fn to_vec(&self) -> Vec<String> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0.split(',').map(str::to_string).collect()
    }
}

impl From<&str> for TsuidList {
    fn from(joined: &str) -> Self {
        TsuidList(joined.to_string())
    }
}

impl From<String> for TsuidList {
    fn from(joined: String) -> Self {
        TsuidList(joined)
    }
}

impl From<Vec<String>> for TsuidList {
    fn from(ids: Vec<String>) -> Self {
        TsuidList(ids.join(","))
    }
}

impl From<&[String]> for TsuidList {
    fn from(ids: &[String]) -> Self {
        TsuidList(ids.join(","))
    }
}

impl From<Vec<&str>> for TsuidList {
    fn from(ids: Vec<&str>) -> Self {
        TsuidList(ids.join(","))
    }
}

impl From<&[&str]> for TsuidList {
    fn from(ids: &[&str]) -> Self {
        TsuidList(ids.join(","))
    }
}
