//! Manipulator dispatch tests

pub mod tests_manipulator;
