//! Element pointer tests
//!
//! Pointers across commits, reloads and structural edits.

pub mod tests_pointer;
