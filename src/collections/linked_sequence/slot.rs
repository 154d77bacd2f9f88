cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::vec::Vec;
    } else {
        use std::vec::Vec;
    }
}

/// the reserved slot index meaning "no slot". it can never be a real
/// position since a `Vec` cannot hold `usize::MAX` elements of a
/// non-zero-sized `Slot`
pub(super) const NIL: usize = usize::MAX;

/// number of slots created by the first growth of an empty store
pub const INITIAL_CAPACITY: usize = 4;

/// one storage cell. a live slot holds `Some(value)` and is linked to its
/// neighbours through `prev`/`next`. a free slot holds `None`, has
/// `prev == NIL`, and uses `next` to chain the free list
pub(super) struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

impl<T> Slot<T> {
    const fn free(next: usize) -> Self {
        Self {
            value: None,
            prev: NIL,
            next,
        }
    }

    pub(super) fn next(&self) -> usize {
        self.next
    }

    pub(super) fn prev(&self) -> usize {
        self.prev
    }

    pub(super) fn value_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(value) => value,
            None => unreachable!("the live chain never links a free slot"),
        }
    }
}

/// a growable array of slots plus the head of the free list threaded
/// through it. positions of occupied slots never change: growth only
/// appends free slots at the end.
pub(super) struct SlotStore<T> {
    slots: Vec<Slot<T>>,
    /// first slot of the free list, NIL when every slot is live
    free: usize,
}

impl<T> SlotStore<T> {
    pub(super) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: NIL,
        }
    }

    /// a store with exactly `capacity` free slots
    pub(super) fn with_capacity(capacity: usize) -> Self {
        let mut store = Self::new();
        store.grow_to(capacity);
        store
    }

    pub(super) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// take a slot off the free list, growing first if there is none, and
    /// fill it with `value` linked between `prev` and `next`. returns the
    /// slot index. neighbours are left for the caller to relink.
    pub(super) fn acquire(&mut self, value: T, prev: usize, next: usize) -> usize {
        if self.free == NIL {
            self.grow();
        }

        let idx = self.free;
        let slot = &mut self.slots[idx];
        debug_assert!(slot.value.is_none());
        self.free = slot.next;
        slot.value = Some(value);
        slot.prev = prev;
        slot.next = next;
        idx
    }

    /// move a live slot onto the free list, returning its value. the
    /// caller must have already unlinked it from its neighbours.
    pub(super) fn release(&mut self, idx: usize) -> T {
        let slot = &mut self.slots[idx];
        let value = match slot.value.take() {
            Some(value) => value,
            None => unreachable!("slot {} released twice", idx),
        };
        slot.prev = NIL;
        slot.next = self.free;
        self.free = idx;
        value
    }

    /// grow until at least `min_capacity` slots exist, following the same
    /// doubling steps as growth on insert
    pub(super) fn reserve(&mut self, min_capacity: usize) {
        while self.capacity() < min_capacity {
            self.grow();
        }
    }

    /// drop every value and put every slot back on the free list in
    /// ascending order
    pub(super) fn clear(&mut self) {
        let capacity = self.capacity();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let next = if idx + 1 == capacity { NIL } else { idx + 1 };
            *slot = Slot::free(next);
        }
        self.free = if capacity == 0 { NIL } else { 0 };
    }

    fn grow(&mut self) {
        let new_capacity = match self.capacity() {
            0 => INITIAL_CAPACITY,
            capacity => capacity * 2,
        };
        self.grow_to(new_capacity);
    }

    // Before: [ live/free slots 0..old ]            free -> (old free chain)
    // After:  [ live/free slots 0..old | old..new ] free -> old -> ... -> new-1 -> (old free chain)
    fn grow_to(&mut self, new_capacity: usize) {
        let old_capacity = self.capacity();
        if new_capacity <= old_capacity {
            return;
        }

        self.slots.reserve_exact(new_capacity - old_capacity);
        let old_free = self.free;
        for idx in old_capacity..new_capacity {
            let next = if idx + 1 == new_capacity {
                old_free
            } else {
                idx + 1
            };
            self.slots.push(Slot::free(next));
        }
        self.free = old_capacity;

        tracing::trace!(
            from = old_capacity,
            to = new_capacity,
            "slot store grown"
        );
    }

    pub(super) fn slot(&self, idx: usize) -> &Slot<T> {
        &self.slots[idx]
    }

    pub(super) fn value(&self, idx: usize) -> &T {
        match &self.slots[idx].value {
            Some(value) => value,
            None => unreachable!("slot {} is on the free list", idx),
        }
    }

    pub(super) fn value_mut(&mut self, idx: usize) -> &mut T {
        self.slots[idx].value_mut()
    }

    pub(super) fn set_prev(&mut self, idx: usize, prev: usize) {
        self.slots[idx].prev = prev;
    }

    pub(super) fn set_next(&mut self, idx: usize, next: usize) {
        self.slots[idx].next = next;
    }

    /// raw access for iterators that hand out disjoint `&mut` borrows
    pub(super) fn as_mut_ptr(&mut self) -> *mut Slot<T> {
        self.slots.as_mut_ptr()
    }

    #[cfg(test)]
    pub(super) fn is_live(&self, idx: usize) -> bool {
        self.slots[idx].value.is_some()
    }

    #[cfg(test)]
    pub(super) fn free_head(&self) -> usize {
        self.free
    }
}

#[cfg(all(test, not(feature = "no-std")))]
mod test {
    use super::*;

    fn free_chain<T>(store: &SlotStore<T>) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut curr = store.free_head();
        while curr != NIL {
            chain.push(curr);
            curr = store.slot(curr).next();
        }
        chain
    }

    #[test]
    fn new_store_has_no_slots() {
        let store = SlotStore::<u32>::new();
        assert_eq!(store.capacity(), 0);
        assert_eq!(store.free_head(), NIL);
    }

    #[test]
    fn with_capacity_chains_every_slot_in_order() {
        let store = SlotStore::<u32>::with_capacity(5);
        assert_eq!(store.capacity(), 5);
        assert_eq!(free_chain(&store), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn first_acquire_grows_to_initial_capacity() {
        let mut store = SlotStore::new();
        let idx = store.acquire(73, NIL, NIL);
        assert_eq!(idx, 0);
        assert_eq!(store.capacity(), INITIAL_CAPACITY);
        assert_eq!(free_chain(&store).len(), INITIAL_CAPACITY - 1);
    }

    #[test]
    fn growth_doubles_and_keeps_live_slots_in_place() {
        let mut store = SlotStore::new();
        let indices: Vec<usize> = (0..INITIAL_CAPACITY as u32 + 1)
            .map(|v| store.acquire(v, NIL, NIL))
            .collect();
        assert_eq!(store.capacity(), INITIAL_CAPACITY * 2);
        for (v, idx) in indices.iter().enumerate() {
            assert_eq!(*store.value(*idx), v as u32);
        }
    }

    #[test]
    fn released_slot_is_reused_first() {
        let mut store = SlotStore::new();
        let a = store.acquire(1, NIL, NIL);
        let _b = store.acquire(2, NIL, NIL);
        assert_eq!(store.release(a), 1);
        assert!(!store.is_live(a));
        assert_eq!(store.acquire(3, NIL, NIL), a);
        assert_eq!(*store.value(a), 3);
    }

    #[test]
    fn growth_appends_to_existing_free_chain() {
        let mut store = SlotStore::with_capacity(2);
        store.acquire(1, NIL, NIL);
        store.reserve(4);
        assert_eq!(store.capacity(), 4);
        assert_eq!(free_chain(&store), vec![2, 3, 1]);
    }

    #[test]
    fn clear_frees_every_slot() {
        let mut store = SlotStore::new();
        for v in 0..6 {
            store.acquire(v, NIL, NIL);
        }
        store.clear();
        assert_eq!(store.capacity(), 8);
        assert_eq!(free_chain(&store), (0..8).collect::<Vec<_>>());
    }
}
