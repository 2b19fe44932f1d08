//! Syntax tree tests
//!
//! Navigation, validity and the mutation path over `mini` documents.

pub mod tests_mutation;
