//! Cyclic browsing over a ranked list.

use crate::domain::Candidate;

use super::RankedList;

/// Browse direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

/// Position within a non-empty [`RankedList`].
///
/// Moving past either end wraps around, so browsing never fails.
#[derive(Debug, Clone)]
pub struct BrowseCursor {
    list: RankedList,
    index: usize,
}

impl BrowseCursor {
    /// Start at the first candidate. `None` when the list is empty.
    pub fn new(list: RankedList) -> Option<Self> {
        if list.is_empty() {
            return None;
        }
        Some(Self { list, index: 0 })
    }

    pub fn current(&self) -> &Candidate {
        &self.list.as_slice()[self.index]
    }

    /// Move one step and return the new current candidate.
    pub fn advance(&mut self, direction: Direction) -> &Candidate {
        let len = self.list.len();
        self.index = match direction {
            Direction::Forward => (self.index + 1) % len,
            Direction::Back => (self.index + len - 1) % len,
        };
        self.current()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn list(&self) -> &RankedList {
        &self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Profile, UserId};

    fn list(ids: &[&str]) -> RankedList {
        ids.iter()
            .map(|id| Candidate::new(Profile::new(UserId::parse(*id).unwrap(), *id, "F1")))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn empty_list_has_no_cursor() {
        assert!(BrowseCursor::new(list(&[])).is_none());
    }

    #[test]
    fn forward_wraps_to_start() {
        let mut cursor = BrowseCursor::new(list(&["a", "b", "c"])).unwrap();
        assert_eq!(cursor.current().user_id().as_str(), "a");
        assert_eq!(cursor.advance(Direction::Forward).user_id().as_str(), "b");
        assert_eq!(cursor.advance(Direction::Forward).user_id().as_str(), "c");
        assert_eq!(cursor.advance(Direction::Forward).user_id().as_str(), "a");
    }

    #[test]
    fn back_from_start_wraps_to_end() {
        let mut cursor = BrowseCursor::new(list(&["a", "b", "c"])).unwrap();
        assert_eq!(cursor.advance(Direction::Back).user_id().as_str(), "c");
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn single_candidate_stays_put() {
        let mut cursor = BrowseCursor::new(list(&["only"])).unwrap();
        assert_eq!(cursor.advance(Direction::Forward).user_id().as_str(), "only");
        assert_eq!(cursor.advance(Direction::Back).user_id().as_str(), "only");
        assert_eq!(cursor.len(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Profile, UserId};
    use proptest::prelude::*;

    fn list(len: usize) -> RankedList {
        (0..len)
            .map(|i| Candidate::new(Profile::new(UserId::parse(format!("u{i}")).unwrap(), "n", "F1")))
            .collect::<Vec<_>>()
            .into()
    }

    proptest! {
        #[test]
        fn len_steps_return_to_start(len in 1usize..30, start in 0usize..30, forward in any::<bool>()) {
            let mut cursor = BrowseCursor::new(list(len)).unwrap();
            for _ in 0..start % len {
                cursor.advance(Direction::Forward);
            }
            let origin = cursor.index();
            let direction = if forward { Direction::Forward } else { Direction::Back };

            for _ in 0..len {
                cursor.advance(direction);
                prop_assert!(cursor.index() < len);
            }
            prop_assert_eq!(cursor.index(), origin);
        }

        #[test]
        fn forward_then_back_is_identity(len in 1usize..30, steps in 0usize..60) {
            let mut cursor = BrowseCursor::new(list(len)).unwrap();
            for _ in 0..steps {
                cursor.advance(Direction::Forward);
            }
            prop_assert_eq!(cursor.index(), steps % len);
            for _ in 0..steps {
                cursor.advance(Direction::Back);
            }
            prop_assert_eq!(cursor.index(), 0);
        }
    }
}
