use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: BTreeSet<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn set(&mut self, name: &str) -> bool {
        self.flags.insert(name.to_string())
    }

    pub fn clear(&mut self, name: &str) -> bool {
        self.flags.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
