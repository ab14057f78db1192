/// One field of a partial update: leave the stored value alone, or replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    Keep,
    Set(T),
}

impl<T> Default for Change<T> {
    fn default() -> Self {
        Change::Keep
    }
}

impl<T> Change<T> {
    /// Writes the new value into `slot` when this is `Set`.
    pub fn apply_to(self, slot: &mut T) {
        if let Change::Set(value) = self {
            *slot = value;
        }
    }
}

/// A partial update that knows how to merge itself onto a record.
pub trait Patch<R> {
    fn apply(self, record: &mut R);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_leaves_value_untouched() {
        let mut name = String::from("Ward A");
        Change::<String>::Keep.apply_to(&mut name);
        assert_eq!(name, "Ward A");
    }

    #[test]
    fn set_replaces_value_even_with_empty() {
        let mut notes = String::from("follow-up");
        Change::Set(String::new()).apply_to(&mut notes);
        assert!(notes.is_empty());
    }
}
