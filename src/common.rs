//!
//! Label types shared by the states and the alphabet
//!
use crate::error::{HmmError, Result};
use fnv::FnvHashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// expected count (soft count) of a transition
pub type Freq = f64;

///
/// Opaque identifier of a hidden state or an alphabet symbol.
///
/// Labels only need to be comparable and hashable; `Display` is used when
/// rendering tables and trace records.
///
pub trait Label: Clone + Eq + Hash + Debug + Display {}
impl<T: Clone + Eq + Hash + Debug + Display> Label for T {}

///
/// Ordered set of labels with a `label -> index` lookup.
///
/// The order in which labels were given is the order of the rows and
/// columns of every dense table in this crate.
///
#[derive(Debug, Clone)]
pub struct Labels<T: Label> {
    items: Vec<T>,
    index: FnvHashMap<T, usize>,
}

impl<T: Label> Labels<T> {
    ///
    /// Create from a non-empty list of distinct labels.
    /// `kind` names the set in error messages ("state", "symbol").
    ///
    pub fn new(items: Vec<T>, kind: &str) -> Result<Self> {
        if items.is_empty() {
            return Err(HmmError::invalid_configuration(format!(
                "the {} set is empty",
                kind
            )));
        }
        let mut index = FnvHashMap::default();
        for (i, item) in items.iter().enumerate() {
            if index.insert(item.clone(), i).is_some() {
                return Err(HmmError::invalid_configuration(format!(
                    "duplicated {} {}",
                    kind, item
                )));
            }
        }
        Ok(Labels { items, index })
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    pub fn index_of(&self, label: &T) -> Option<usize> {
        self.index.get(label).copied()
    }
    pub fn contains(&self, label: &T) -> bool {
        self.index.contains_key(label)
    }
    /// label of the index. panics if out of range.
    pub fn get(&self, index: usize) -> &T {
        &self.items[index]
    }
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_lookup() {
        let labels = Labels::new(vec!['b', 'a', '#'], "symbol").unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.index_of(&'b'), Some(0));
        assert_eq!(labels.index_of(&'#'), Some(2));
        assert_eq!(labels.index_of(&'z'), None);
        assert_eq!(*labels.get(1), 'a');
        assert!(labels.contains(&'a'));
        assert_eq!(labels.iter().copied().collect::<String>(), "ba#");
    }
    #[test]
    fn labels_reject_empty_and_duplicates() {
        let empty: Vec<u32> = vec![];
        assert!(matches!(
            Labels::new(empty, "state"),
            Err(HmmError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Labels::new(vec![0, 1, 0], "state"),
            Err(HmmError::InvalidConfiguration(_))
        ));
    }
}
