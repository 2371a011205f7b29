pub mod input_loader;
pub mod load;
pub mod parse;

#[cfg(test)]
mod parse_tests;
