#![cfg_attr(feature = "no-std", no_std)]

#[cfg(feature = "no-std")]
extern crate alloc;

pub mod collections;

pub use collections::linked_sequence::{
    Cursor, CursorMut, LinkedSequence, SequenceError, SequenceResult,
};
