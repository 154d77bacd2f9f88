use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::slot::{Slot, SlotStore};
use super::LinkedSequence;

/// an immutable, double-ended walk over the live chain
pub struct Iter<'a, T> {
    store: &'a SlotStore<T>,
    head: usize,
    tail: usize,
    /// elements not yet yielded from either end
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(store: &'a SlotStore<T>, head: usize, tail: usize, len: usize) -> Self {
        Self {
            store,
            head,
            tail,
            remaining: len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = self.head;
        self.head = self.store.slot(idx).next();
        self.remaining -= 1;
        Some(self.store.value(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = self.tail;
        self.tail = self.store.slot(idx).prev();
        self.remaining -= 1;
        Some(self.store.value(idx))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            head: self.head,
            tail: self.tail,
            remaining: self.remaining,
        }
    }
}

/// a mutable, double-ended walk over the live chain
pub struct IterMut<'a, T> {
    slots: *mut Slot<T>,
    head: usize,
    tail: usize,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(store: &'a mut SlotStore<T>, head: usize, tail: usize, len: usize) -> Self {
        Self {
            slots: store.as_mut_ptr(),
            head,
            tail,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // SAFETY: `head` is a live slot of the store we mutably borrow for
        // 'a. each live slot is yielded once: `remaining` stops the walk
        // before the front and back halves overlap.
        unsafe {
            let slot = &mut *self.slots.add(self.head);
            self.head = slot.next();
            self.remaining -= 1;
            Some(slot.value_mut())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        // SAFETY: see `next`
        unsafe {
            let slot = &mut *self.slots.add(self.tail);
            self.tail = slot.prev();
            self.remaining -= 1;
            Some(slot.value_mut())
        }
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> FusedIterator for IterMut<'a, T> {}

// the raw slot pointer stands in for the `&'a mut SlotStore<T>` borrow
unsafe impl<'a, T: Send> Send for IterMut<'a, T> {}

unsafe impl<'a, T: Sync> Sync for IterMut<'a, T> {}

/// an owning iterator, popping elements off either end of the sequence
pub struct IntoIter<T> {
    seq: LinkedSequence<T>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(seq: LinkedSequence<T>) -> Self {
        Self { seq }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.seq.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.seq.len(), Some(self.seq.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.seq.pop_back().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

#[cfg(all(test, not(feature = "no-std")))]
mod iter_test {
    use super::*;

    #[test]
    fn basic_iter_test() {
        let nums = [73, 42, 114, 901];
        let seq = LinkedSequence::from(nums);
        assert_eq!(seq.iter().len(), nums.len());
        for (value, num) in seq.iter().zip(nums.iter()) {
            assert_eq!(value, num);
        }
    }

    #[test]
    fn iter_terminates_properly_single_element() {
        let seq = LinkedSequence::from([42]);
        let mut iter = seq.iter();
        assert_eq!(iter.next(), Some(&42));
        for _i in 0..10 {
            assert!(iter.next().is_none());
        }
    }

    #[test]
    fn iter_from_both_ends_meets_in_the_middle() {
        let seq = LinkedSequence::from([1, 2, 3, 4, 5]);
        let mut iter = seq.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iter_follows_links_not_slot_order() {
        let mut seq = LinkedSequence::new();
        seq.push_back(2);
        seq.push_front(1);
        seq.push_back(3);
        seq.push_front(0);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(seq.iter().rev().copied().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn basic_iter_mut_test() {
        let mut seq = LinkedSequence::from([1, 2, 3]);
        for value in seq.iter_mut() {
            *value += 1;
        }
        assert_eq!(seq, LinkedSequence::from([2, 3, 4]));
    }

    #[test]
    fn iter_mut_from_both_ends_yields_each_element_once() {
        let mut seq = LinkedSequence::from([1, 2, 3, 4]);
        let mut iter = seq.iter_mut();
        let a = iter.next().expect("should produce a value");
        let d = iter.next_back().expect("should produce a value");
        let b = iter.next().expect("should produce a value");
        let c = iter.next_back().expect("should produce a value");
        assert!(iter.next().is_none());
        core::mem::swap(a, d);
        core::mem::swap(b, c);
        assert_eq!(seq, LinkedSequence::from([4, 3, 2, 1]));
    }

    #[test]
    fn into_iter_drains_in_order() {
        let seq = LinkedSequence::from(["a".to_string(), "b".to_string(), "c".to_string()]);
        let mut iter = seq.into_iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next_back().as_deref(), Some("c"));
        assert_eq!(iter.collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn borrowed_into_iter_works_in_for_loops() {
        let mut seq = LinkedSequence::from([1, 2, 3]);
        for value in &mut seq {
            *value *= 2;
        }
        let mut sum = 0;
        for value in &seq {
            sum += value;
        }
        assert_eq!(sum, 12);
    }
}
