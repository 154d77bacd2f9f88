mod cursor;
mod error;
mod iter;
mod slot;

use core::fmt;
use core::ops::{Index, IndexMut};

pub use cursor::{Cursor, CursorMut};
pub use error::{SequenceError, SequenceResult};
pub use iter::{IntoIter, Iter, IterMut};
pub use slot::INITIAL_CAPACITY;

use slot::{SlotStore, NIL};

/// a doubly-linked list whose nodes live in a single growable array of
/// slots instead of individual heap allocations. links are slot indices,
/// unused slots are chained into a free list, and growth only ever appends
/// slots so the position of a live element never changes.
///
/// pushing and popping at either end is O(1) (amortized when the store has
/// to grow), positional access walks from whichever end is closer.
pub struct LinkedSequence<T> {
    store: SlotStore<T>,
    /// first live slot, NIL when empty
    head: usize,
    /// last live slot, NIL when empty
    tail: usize,
    /// the number of live slots
    len: usize,
}

impl<T> LinkedSequence<T> {
    /// create an empty sequence. no slots are allocated until the first push
    pub const fn new() -> Self {
        Self {
            store: SlotStore::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// create an empty sequence with exactly `capacity` free slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: SlotStore::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// get the number of elements in the sequence
    pub fn len(&self) -> usize {
        self.len
    }

    /// returns true if the length of the sequence is 0
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// the number of slots, live or free, currently in the slot store
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// make room for at least `additional` more elements without further
    /// growth
    pub fn reserve(&mut self, additional: usize) {
        self.store.reserve(self.len.saturating_add(additional));
    }

    /// drop every element, keeping the slot store for reuse
    pub fn clear(&mut self) {
        tracing::trace!(len = self.len, capacity = self.capacity(), "clearing sequence");
        self.store.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    /// push a value to the back of the sequence, growing the slot store if
    /// no free slot is left
    pub fn push_back(&mut self, value: T) {
        let idx = self.store.acquire(value, self.tail, NIL);
        if self.tail == NIL {
            self.head = idx;
        } else {
            self.store.set_next(self.tail, idx);
        }
        self.tail = idx;
        self.len += 1;
    }

    /// push a value to the front of the sequence, growing the slot store if
    /// no free slot is left
    pub fn push_front(&mut self, value: T) {
        let idx = self.store.acquire(value, NIL, self.head);
        if self.head == NIL {
            self.tail = idx;
        } else {
            self.store.set_prev(self.head, idx);
        }
        self.head = idx;
        self.len += 1;
    }

    /// remove and return the first element
    pub fn pop_front(&mut self) -> SequenceResult<T> {
        if self.len == 0 {
            return Err(SequenceError::Empty);
        }

        let idx = self.head;
        let new_head = self.store.slot(idx).next();
        if new_head == NIL {
            self.tail = NIL;
        } else {
            self.store.set_prev(new_head, NIL);
        }
        self.head = new_head;
        self.len -= 1;
        Ok(self.store.release(idx))
    }

    /// remove and return the last element
    pub fn pop_back(&mut self) -> SequenceResult<T> {
        if self.len == 0 {
            return Err(SequenceError::Empty);
        }

        let idx = self.tail;
        let new_tail = self.store.slot(idx).prev();
        if new_tail == NIL {
            self.head = NIL;
        } else {
            self.store.set_next(new_tail, NIL);
        }
        self.tail = new_tail;
        self.len -= 1;
        Ok(self.store.release(idx))
    }

    /// get the first element, or `Empty` if there is none
    pub fn front(&self) -> SequenceResult<&T> {
        if self.len == 0 {
            return Err(SequenceError::Empty);
        }
        Ok(self.store.value(self.head))
    }

    /// mutably borrow the first element
    pub fn front_mut(&mut self) -> SequenceResult<&mut T> {
        if self.len == 0 {
            return Err(SequenceError::Empty);
        }
        Ok(self.store.value_mut(self.head))
    }

    /// get the last element, or `Empty` if there is none
    pub fn back(&self) -> SequenceResult<&T> {
        if self.len == 0 {
            return Err(SequenceError::Empty);
        }
        Ok(self.store.value(self.tail))
    }

    /// mutably borrow the last element
    pub fn back_mut(&mut self) -> SequenceResult<&mut T> {
        if self.len == 0 {
            return Err(SequenceError::Empty);
        }
        Ok(self.store.value_mut(self.tail))
    }

    /// get the element at position `index`, counting from the front
    pub fn get(&self, index: usize) -> SequenceResult<&T> {
        let idx = self.locate(index)?;
        Ok(self.store.value(idx))
    }

    /// mutably borrow the element at position `index`, counting from the
    /// front
    pub fn get_mut(&mut self, index: usize) -> SequenceResult<&mut T> {
        let idx = self.locate(index)?;
        Ok(self.store.value_mut(idx))
    }

    /// find the slot holding position `index`, walking from the head for
    /// the first half of the sequence and from the tail for the second
    fn locate(&self, index: usize) -> SequenceResult<usize> {
        if index >= self.len {
            return Err(SequenceError::OutOfRange {
                index,
                len: self.len,
            });
        }

        let mut curr;
        if index < self.len / 2 {
            curr = self.head;
            for _ in 0..index {
                curr = self.store.slot(curr).next();
            }
        } else {
            curr = self.tail;
            for _ in 0..(self.len - 1 - index) {
                curr = self.store.slot(curr).prev();
            }
        }

        Ok(curr)
    }

    /// a cursor at the first element, equal to `end()` when empty
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.head)
    }

    /// the cursor one past the last element
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self, NIL)
    }

    /// a mutating cursor at the first element
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        let head = self.head;
        CursorMut::new(self, head)
    }

    /// return an immutable iterator over the elements, front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.store, self.head, self.tail, self.len)
    }

    /// return a mutable iterator over the elements, front to back
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (head, tail, len) = (self.head, self.tail, self.len);
        IterMut::new(&mut self.store, head, tail, len)
    }
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// copies get a fresh slot store sized to exactly the live elements, linked
/// front to back in slots `0..len`. nothing is shared with the source.
impl<T: Clone> Clone for LinkedSequence<T> {
    fn clone(&self) -> Self {
        tracing::trace!(len = self.len, "copying sequence");
        let mut copy = Self::with_capacity(self.len);
        copy.extend(self.iter().cloned());
        copy
    }

    /// the target's own slot store is released before the copy is built
    fn clone_from(&mut self, source: &Self) {
        tracing::trace!(
            len = source.len,
            replaced = self.len,
            "assigning sequence"
        );
        *self = Self::new();
        self.store = SlotStore::with_capacity(source.len);
        self.extend(source.iter().cloned());
    }
}

impl<T> Index<usize> for LinkedSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> IndexMut<usize> for LinkedSequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

/// renders as `[e0, e1, ..., en-1]`, or `[]` when empty
impl<T: fmt::Display> fmt::Display for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut curr = self.begin();
        let mut first = true;
        while let Ok(value) = curr.elem() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            fmt::Display::fmt(value, f)?;
            // elem succeeded, so the cursor is not at the end yet
            let _ = curr.advance();
        }
        f.write_str("]")
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for LinkedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for LinkedSequence<T> {}

impl<T> Extend<T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for LinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T, const N: usize> From<[T; N]> for LinkedSequence<T> {
    fn from(values: [T; N]) -> Self {
        let mut seq = Self::with_capacity(N);
        seq.extend(values);
        seq
    }
}

impl<T> IntoIterator for LinkedSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a LinkedSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut LinkedSequence<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
impl<T> LinkedSequence<T> {
    /// walk both chains and the free list, panicking on any broken link
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.head == NIL, self.len == 0);
        assert_eq!(self.tail == NIL, self.len == 0);
        assert!(self.capacity() >= self.len);

        let mut forward = 0;
        let mut prev = NIL;
        let mut curr = self.head;
        while curr != NIL {
            assert!(self.store.is_live(curr), "free slot {} in live chain", curr);
            assert_eq!(self.store.slot(curr).prev(), prev, "broken prev link");
            forward += 1;
            assert!(forward <= self.len, "live chain longer than len");
            prev = curr;
            curr = self.store.slot(curr).next();
        }
        assert_eq!(prev, self.tail);
        assert_eq!(forward, self.len);

        let mut backward = 0;
        let mut curr = self.tail;
        while curr != NIL {
            backward += 1;
            assert!(backward <= self.len, "reverse chain longer than len");
            curr = self.store.slot(curr).prev();
        }
        assert_eq!(backward, self.len);

        let mut free = 0;
        let mut curr = self.store.free_head();
        while curr != NIL {
            assert!(!self.store.is_live(curr), "live slot {} in free list", curr);
            free += 1;
            assert!(free <= self.capacity(), "free list has a cycle");
            curr = self.store.slot(curr).next();
        }
        assert_eq!(free + self.len, self.capacity());
    }
}


// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test, not(feature = "no-std")))]
mod proptests {
    use std::collections::VecDeque;

    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::test_runner::Config;
    use proptest_derive::Arbitrary;
    use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};
    use rand::Rng;

    use super::*;

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(Config {
            failure_persistence: None,
            .. Config::default()
        })]

        #[test]
        fn linked_sequence_state_machine_test(
            sequential
            1..300
            =>
            LinkedSequence<u32>
        );
    }

    #[derive(Clone, Debug)]
    pub enum Transition {
        PushFront(u32),
        PopFront,
        PushBack(u32),
        PopBack,
        /// overwrite the element at `index % len`, ignored when empty
        Set(usize, u32),
        Clear,
    }

    pub struct LinkedSequenceStateMachine;

    impl ReferenceStateMachine for LinkedSequenceStateMachine {
        type State = VecDeque<u32>;
        type Transition = Transition;

        fn init_state() -> BoxedStrategy<Self::State> {
            Just(VecDeque::new()).boxed()
        }

        fn transitions(_state: &Self::State) -> BoxedStrategy<Self::Transition> {
            prop_oneof![
                2 => Just(Transition::PopFront),
                3 => (any::<u32>()).prop_map(Transition::PushFront),
                2 => Just(Transition::PopBack),
                3 => (any::<u32>()).prop_map(Transition::PushBack),
                2 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Transition::Set(i, v)),
                1 => Just(Transition::Clear),
            ]
            .boxed()
        }

        fn apply(mut state: Self::State, transition: &Self::Transition) -> Self::State {
            match transition {
                Transition::PushFront(value) => state.push_front(*value),
                Transition::PopFront => {
                    state.pop_front();
                }
                Transition::PushBack(value) => state.push_back(*value),
                Transition::PopBack => {
                    state.pop_back();
                }
                Transition::Set(index, value) => {
                    if !state.is_empty() {
                        let len = state.len();
                        state[index % len] = *value;
                    }
                }
                Transition::Clear => state.clear(),
            }
            state
        }
    }

    impl StateMachineTest for LinkedSequence<u32> {
        type SystemUnderTest = Self;
        type Reference = LinkedSequenceStateMachine;

        fn init_test(
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) -> Self::SystemUnderTest {
            Self::new()
        }

        fn apply(
            mut state: Self::SystemUnderTest,
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
            transition: Transition,
        ) -> Self::SystemUnderTest {
            match transition {
                Transition::PushFront(value) => state.push_front(value),
                Transition::PopFront => {
                    let front = state.front().copied();
                    assert_eq!(state.pop_front(), front);
                }
                Transition::PushBack(value) => state.push_back(value),
                Transition::PopBack => {
                    let back = state.back().copied();
                    assert_eq!(state.pop_back(), back);
                }
                Transition::Set(index, value) => {
                    if state.is_empty() {
                        assert!(state.get_mut(index).is_err());
                    } else {
                        let len = state.len();
                        state[index % len] = value;
                    }
                }
                Transition::Clear => state.clear(),
            }
            state
        }

        fn check_invariants(
            state: &Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) {
            state.assert_invariants();
            assert_eq!(state.len(), ref_state.len());
            assert_eq!(state.is_empty(), ref_state.is_empty());

            for (value, ref_value) in state.iter().zip(ref_state.iter()) {
                assert_eq!(value, ref_value);
            }
            for (i, ref_value) in ref_state.iter().enumerate() {
                assert_eq!(&state[i], ref_value);
            }
            assert!(state.iter().rev().eq(ref_state.iter().rev()));
        }
    }

    #[derive(Arbitrary, Clone, Debug)]
    enum Operation {
        PushBack(u32),
        PushFront(u32),
        PopBack,
        PopFront,
        Set(u32),
        Copy,
        Assign,
    }

    fn apply_op(
        target: &mut LinkedSequence<u32>,
        target_ref: &mut VecDeque<u32>,
        other: &LinkedSequence<u32>,
        other_ref: &VecDeque<u32>,
        op: &Operation,
    ) {
        match op {
            Operation::PushBack(value) => {
                target.push_back(*value);
                target_ref.push_back(*value);
            }
            Operation::PushFront(value) => {
                target.push_front(*value);
                target_ref.push_front(*value);
            }
            Operation::PopBack => assert_eq!(target.pop_back().ok(), target_ref.pop_back()),
            Operation::PopFront => assert_eq!(target.pop_front().ok(), target_ref.pop_front()),
            Operation::Set(value) => {
                if !target_ref.is_empty() {
                    let index = rand::thread_rng().gen_range(0..target_ref.len());
                    target[index] = *value;
                    target_ref[index] = *value;
                }
            }
            Operation::Copy => {
                *target = other.clone();
                assert_eq!(target.capacity(), target.len());
                *target_ref = other_ref.clone();
            }
            Operation::Assign => {
                target.clone_from(other);
                *target_ref = other_ref.clone();
            }
        }
    }

    proptest! {
        #[test]
        fn copies_and_assignments_never_share_storage(
            ops in vec(any::<(bool, Operation)>(), 1..256)
        ) {
            let mut a = LinkedSequence::new();
            let mut b = LinkedSequence::new();
            let mut a_ref = VecDeque::new();
            let mut b_ref = VecDeque::new();

            for (on_a, op) in ops.iter() {
                if *on_a {
                    apply_op(&mut a, &mut a_ref, &b, &b_ref, op);
                } else {
                    apply_op(&mut b, &mut b_ref, &a, &a_ref, op);
                }

                a.assert_invariants();
                b.assert_invariants();
                prop_assert!(a.iter().eq(a_ref.iter()));
                prop_assert!(b.iter().eq(b_ref.iter()));
            }
        }

        #[test]
        fn growth_is_transparent(values in vec(any::<u32>(), 0..2048)) {
            let mut back = LinkedSequence::new();
            let mut front = LinkedSequence::new();
            for value in values.iter() {
                back.push_back(*value);
                front.push_front(*value);
            }

            prop_assert_eq!(back.len(), values.len());
            for (i, value) in values.iter().enumerate() {
                prop_assert_eq!(&back[i], value);
                prop_assert_eq!(&front[values.len() - 1 - i], value);
            }
        }

        #[test]
        fn rendering_matches_element_display(values in vec(any::<i64>(), 0..32)) {
            let seq: LinkedSequence<i64> = values.iter().copied().collect();
            let expected = format!(
                "[{}]",
                values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
            );
            prop_assert_eq!(seq.to_string(), expected);
        }
    }
}
