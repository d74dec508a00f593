use derive_more::Display;
/// Identifiers and the program-wide fresh-name generator
use std::collections::{HashMap, HashSet};

/// Identifiers
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for Id {
    fn from(i: T) -> Self {
        Id(i.into())
    }
}

/// A fresh-name generator that should be passed to every pass that needs
/// names for compiler-generated code.
///
/// Every name that already appears in the program must be [reserved](ReferenceMap::reserve)
/// before the first call to [new_name](ReferenceMap::new_name); names handed
/// out afterwards are guaranteed to collide neither with reserved names nor
/// with each other.
#[derive(Default)]
pub struct ReferenceMap {
    used_names: HashSet<String>,
    next_index: HashMap<String, usize>,
}

impl ReferenceMap {
    /// record a name that the program already declares or references
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.used_names.insert(name.into());
    }

    /// a name unique within the program, built from a descriptive base
    ///
    /// ```
    /// # use libflowscript::shared::ReferenceMap;
    /// let mut refs = ReferenceMap::default();
    /// refs.reserve("tmp_0");
    /// let name = refs.new_name("tmp");
    /// assert_eq!(name.as_str(), "tmp_1");
    /// ```
    pub fn new_name(&mut self, base: &str) -> Id {
        let index = self.next_index.entry(base.to_owned()).or_insert(0);
        loop {
            let candidate = format!("{}_{}", base, *index);
            *index += 1;
            if self.used_names.insert(candidate.clone()) {
                return Id::from(candidate);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_are_fresh() {
        let mut refs = ReferenceMap::default();
        refs.reserve("x");
        refs.reserve("tmp_1");
        assert_eq!(refs.new_name("tmp").as_str(), "tmp_0");
        assert_eq!(refs.new_name("tmp").as_str(), "tmp_2");
        assert_eq!(refs.new_name("retval").as_str(), "retval_0");
    }
}
