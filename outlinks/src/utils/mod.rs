pub mod generator;
pub mod test_utils;
