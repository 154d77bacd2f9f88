pub type SequenceResult<T> = Result<T, SequenceError>;

/// a violated precondition of a [`LinkedSequence`](super::LinkedSequence)
/// operation. every fallible operation checks its precondition before
/// touching any link, so an `Err` always leaves the sequence unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceError {
    /// `pop_*`, `front*` or `back*` on a sequence with no elements
    Empty,
    /// positional access past the last element
    OutOfRange { index: usize, len: usize },
    /// `elem` or `advance` on a cursor already at the end position
    CursorExhausted,
}

impl core::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => f.write_str("operation requires a non-empty sequence"),
            Self::OutOfRange { index, len } => write!(
                f,
                "index out of range: the len is {} but the index is {}",
                len, index
            ),
            Self::CursorExhausted => f.write_str("cursor is already at the end of the sequence"),
        }
    }
}

#[cfg(not(feature = "no-std"))]
impl std::error::Error for SequenceError {}

#[cfg(all(test, not(feature = "no-std")))]
mod test {
    use super::*;

    #[test]
    fn out_of_range_message_names_index_and_len() {
        let err = SequenceError::OutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "index out of range: the len is 3 but the index is 7"
        );
    }

    #[test]
    fn errors_are_std_errors() {
        fn error<E: std::error::Error>(_: E) {}
        error(SequenceError::Empty);
        error(SequenceError::CursorExhausted);
    }
}
