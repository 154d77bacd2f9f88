use super::{LinkedSequence, SequenceError, SequenceResult, NIL};

/// a position in a [`LinkedSequence`]: either a live slot or the end
/// position one past the last element.
///
/// cursors borrow the sequence, so it cannot be mutated while a cursor is
/// outstanding. two cursors are equal when they belong to the same sequence
/// and point at the same slot; element values are never compared.
pub struct Cursor<'a, T> {
    seq: &'a LinkedSequence<T>,
    /// the current slot, NIL at the end position
    slot: usize,
}

impl<'a, T> Cursor<'a, T> {
    pub(super) fn new(seq: &'a LinkedSequence<T>, slot: usize) -> Self {
        Self { seq, slot }
    }

    /// returns true if the cursor is one past the last element
    pub fn is_end(&self) -> bool {
        self.slot == NIL
    }

    /// the element at the current position
    pub fn elem(&self) -> SequenceResult<&'a T> {
        if self.is_end() {
            return Err(SequenceError::CursorExhausted);
        }
        Ok(self.seq.store.value(self.slot))
    }

    /// move the cursor forward one element, onto the end position after the
    /// last element
    pub fn advance(&mut self) -> SequenceResult<()> {
        if self.is_end() {
            return Err(SequenceError::CursorExhausted);
        }
        self.slot = self.seq.store.slot(self.slot).next();
        Ok(())
    }
}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Cursor<'a, T> {}

impl<'a, T> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.seq, other.seq) && self.slot == other.slot
    }
}

impl<'a, T> Eq for Cursor<'a, T> {}

impl<'a, T> core::fmt::Debug for Cursor<'a, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct("Cursor");
        s.field("seq", &core::ptr::addr_of!(*self.seq));
        if self.is_end() {
            s.field("slot", &"end");
        } else {
            s.field("slot", &self.slot);
        }
        s.finish()
    }
}

/// a forward cursor that can also modify the element it points at
pub struct CursorMut<'a, T> {
    seq: &'a mut LinkedSequence<T>,
    slot: usize,
}

impl<'a, T> CursorMut<'a, T> {
    pub(super) fn new(seq: &'a mut LinkedSequence<T>, slot: usize) -> Self {
        Self { seq, slot }
    }

    pub fn is_end(&self) -> bool {
        self.slot == NIL
    }

    pub fn elem(&self) -> SequenceResult<&T> {
        if self.is_end() {
            return Err(SequenceError::CursorExhausted);
        }
        Ok(self.seq.store.value(self.slot))
    }

    pub fn elem_mut(&mut self) -> SequenceResult<&mut T> {
        if self.is_end() {
            return Err(SequenceError::CursorExhausted);
        }
        Ok(self.seq.store.value_mut(self.slot))
    }

    pub fn advance(&mut self) -> SequenceResult<()> {
        if self.is_end() {
            return Err(SequenceError::CursorExhausted);
        }
        self.slot = self.seq.store.slot(self.slot).next();
        Ok(())
    }
}

#[cfg(all(test, not(feature = "no-std")))]
mod cursor_test {
    use super::*;

    #[test]
    fn cursor_on_empty_sequence_is_at_begin_and_end() {
        let seq = LinkedSequence::<i32>::new();
        assert!(seq.begin() == seq.end());
        assert!(seq.begin().is_end());
    }

    #[test]
    fn cursor_on_single_element_is_not_at_end() {
        let mut seq = LinkedSequence::new();
        seq.push_back(10);
        assert!(seq.begin() != seq.end());
    }

    #[test]
    fn cursor_yields_the_only_element() {
        let mut seq = LinkedSequence::new();
        seq.push_back(10);
        assert_eq!(seq.begin().elem(), Ok(&10));
    }

    #[test]
    fn after_advancing_past_only_element_cursor_is_at_end() {
        let mut seq = LinkedSequence::new();
        seq.push_back(10);
        let mut it = seq.begin();
        it.advance().expect("failed to advance");
        assert!(it == seq.end());
    }

    #[test]
    fn cursor_walks_two_elements_then_reaches_end() {
        let seq = LinkedSequence::from([10, 20]);
        let mut it = seq.begin();
        assert!(it != seq.end());
        assert_eq!(it.elem(), Ok(&10));

        it.advance().expect("failed to advance");
        assert!(it != seq.end());
        assert_eq!(it.elem(), Ok(&20));

        it.advance().expect("failed to advance");
        assert!(it == seq.end());
    }

    #[test]
    fn exhausted_cursor_reports_errors_and_stays_at_end() {
        let seq = LinkedSequence::from([10]);
        let mut it = seq.end();
        assert_eq!(it.elem(), Err(SequenceError::CursorExhausted));
        assert_eq!(it.advance(), Err(SequenceError::CursorExhausted));
        assert!(it == seq.end());
    }

    #[test]
    fn cursor_advanced_to_end_reports_errors() {
        let seq = LinkedSequence::from([10, 20]);
        let mut it = seq.begin();
        it.advance().expect("failed to advance");
        it.advance().expect("failed to advance");
        assert!(it == seq.end());
        assert_eq!(it.advance(), Err(SequenceError::CursorExhausted));
        assert_eq!(it.elem(), Err(SequenceError::CursorExhausted));
        assert!(it == seq.end());
    }

    #[test]
    fn advancing_len_times_reaches_end_in_order() {
        let mut seq = LinkedSequence::new();
        for i in 0..37 {
            seq.push_front(i);
        }
        let mut it = seq.begin();
        for i in 0..seq.len() {
            assert_eq!(it.elem(), Ok(&seq[i]));
            it.advance().expect("failed to advance");
        }
        assert!(it == seq.end());
    }

    #[test]
    fn end_cursors_of_different_sequences_differ() {
        let a = LinkedSequence::<i32>::new();
        let b = LinkedSequence::<i32>::new();
        assert!(a.end() == a.end());
        assert!(a.end() != b.end());
    }

    #[test]
    fn cursors_compare_by_position_not_value() {
        let seq = LinkedSequence::from([5, 5]);
        let first = seq.begin();
        let mut second = seq.begin();
        second.advance().expect("failed to advance");
        assert_eq!(first.elem(), second.elem());
        assert!(first != second);
    }

    #[test]
    fn cursor_mut_can_modify_elements() {
        let mut seq = LinkedSequence::from([1, 2, 3]);
        let mut it = seq.begin_mut();
        while !it.is_end() {
            *it.elem_mut().expect("not at end") *= 10;
            it.advance().expect("failed to advance");
        }
        assert_eq!(it.elem(), Err(SequenceError::CursorExhausted));
        assert_eq!(it.elem_mut(), Err(SequenceError::CursorExhausted));
        assert_eq!(seq.to_string(), "[10, 20, 30]");
    }
}
