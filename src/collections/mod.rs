pub mod linked_sequence;
