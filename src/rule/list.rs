//! Ordered unique lists and the edits applied to them

use super::Outcome;
use serde::{Deserialize, Serialize};

/// Equality used to keep list entries unique
///
/// Most entries are unique by value. Entries with an identity of their own,
/// such as YARA strings keyed by identifier, override [`Entry::same_as`].
pub trait Entry: PartialEq {
    /// Whether two entries occupy the same slot in a list
    fn same_as(&self, other: &Self) -> bool {
        self == other
    }
}

impl Entry for String {}

/// Edit operation on a [`NamedList`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOp<T> {
    /// Append an entry
    Add(T),
    /// Replace the entry at an index
    Update(usize, T),
    /// Remove the entry at an index
    Remove(usize),
    /// Move an entry to a new position
    Move {
        /// Current index
        from: usize,
        /// Target index
        to: usize,
    },
    /// Remove every entry
    Clear,
}

/// Ordered list whose entries are unique
///
/// Insertion order is emission order, so it is preserved by every operation
/// except an explicit [`ListOp::Move`]. Inserting an entry that is already
/// present leaves the list untouched and reports [`Outcome::Duplicate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Vec<T>",
    into = "Vec<T>",
    bound(
        serialize = "T: Serialize + Clone",
        deserialize = "T: Deserialize<'de> + Entry"
    )
)]
pub struct NamedList<T>(Vec<T>);

impl<T> Default for NamedList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> NamedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in emission order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Entry at an index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    /// Mutable entry at an index
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.0.get_mut(index)
    }

    /// Underlying slice
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Remove the entry at an index
    pub fn remove(&mut self, index: usize) -> Outcome {
        if index >= self.0.len() {
            return Outcome::NotFound;
        }
        self.0.remove(index);
        Outcome::Applied
    }

    /// Move the entry at `from` so it ends up at `to`
    pub fn move_entry(&mut self, from: usize, to: usize) -> Outcome {
        if from >= self.0.len() || to >= self.0.len() {
            return Outcome::NotFound;
        }
        let entry = self.0.remove(from);
        self.0.insert(to, entry);
        Outcome::Applied
    }
}

impl<T: Entry> NamedList<T> {
    /// Whether an equivalent entry is present
    pub fn contains(&self, entry: &T) -> bool {
        self.0.iter().any(|existing| existing.same_as(entry))
    }

    /// Append an entry unless an equivalent one exists
    pub fn insert(&mut self, entry: T) -> Outcome {
        if self.contains(&entry) {
            return Outcome::Duplicate;
        }
        self.0.push(entry);
        Outcome::Applied
    }

    /// Replace the entry at an index
    ///
    /// Replacing an entry with an equivalent of another entry is a duplicate.
    pub fn update(&mut self, index: usize, entry: T) -> Outcome {
        if index >= self.0.len() {
            return Outcome::NotFound;
        }
        let clashes = self
            .0
            .iter()
            .enumerate()
            .any(|(i, existing)| i != index && existing.same_as(&entry));
        if clashes {
            return Outcome::Duplicate;
        }
        self.0[index] = entry;
        Outcome::Applied
    }

    /// Remove the first equivalent entry
    pub fn remove_value(&mut self, entry: &T) -> Outcome {
        match self.0.iter().position(|existing| existing.same_as(entry)) {
            Some(index) => self.remove(index),
            None => Outcome::NotFound,
        }
    }

    /// Apply a [`ListOp`]
    pub fn apply(&mut self, op: ListOp<T>) -> Outcome {
        match op {
            ListOp::Add(entry) => self.insert(entry),
            ListOp::Update(index, entry) => self.update(index, entry),
            ListOp::Remove(index) => self.remove(index),
            ListOp::Move { from, to } => self.move_entry(from, to),
            ListOp::Clear => {
                self.clear();
                Outcome::Applied
            }
        }
    }

    /// Apply a [`ListOp`] after checking any entry it carries
    pub(crate) fn apply_checked(
        &mut self,
        op: ListOp<T>,
        check: impl Fn(&T) -> Result<(), String>,
    ) -> Outcome {
        let candidate = match &op {
            ListOp::Add(entry) | ListOp::Update(_, entry) => Some(entry),
            _ => None,
        };
        if let Some(entry) = candidate {
            if let Err(reason) = check(entry) {
                return Outcome::Rejected(reason);
            }
        }
        self.apply(op)
    }
}

impl NamedList<String> {
    /// Apply a [`ListOp`] to a text list, trimming values and refusing blanks
    pub fn apply_text(&mut self, op: ListOp<String>) -> Outcome {
        self.apply_text_checked(op, |_| Ok(()))
    }

    /// [`NamedList::apply_text`] with an extra check on the trimmed value
    pub(crate) fn apply_text_checked(
        &mut self,
        op: ListOp<String>,
        check: impl Fn(&str) -> Result<(), String>,
    ) -> Outcome {
        let op = match op {
            ListOp::Add(value) => ListOp::Add(value.trim().to_string()),
            ListOp::Update(index, value) => ListOp::Update(index, value.trim().to_string()),
            other => other,
        };
        self.apply_checked(op, |value| {
            if value.is_empty() {
                Err("value is empty".to_string())
            } else {
                check(value)
            }
        })
    }
}

impl<T: Entry> From<Vec<T>> for NamedList<T> {
    fn from(entries: Vec<T>) -> Self {
        let mut list = Self::new();
        for entry in entries {
            list.insert(entry);
        }
        list
    }
}

impl<T> From<NamedList<T>> for Vec<T> {
    fn from(list: NamedList<T>) -> Self {
        list.0
    }
}

impl<T: Entry> FromIterator<T> for NamedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.insert(entry);
        }
        list
    }
}

impl<'a, T> IntoIterator for &'a NamedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> IntoIterator for NamedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<&[&str]> for NamedList<String> {
    fn from(values: &[&str]) -> Self {
        values.iter().map(|s| s.to_string()).collect()
    }
}
