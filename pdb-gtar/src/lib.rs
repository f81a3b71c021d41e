#[cfg(test)]
#[macro_use]
extern crate assert_float_eq;

pub mod test_utils;

pub mod application;
pub mod color;
pub mod fetch;
pub mod frame;
pub mod geometry;
pub mod parsers;
pub mod trajectory;
