pub mod duplicate;
pub mod hash;
pub mod report;
pub mod scanner;
pub mod split;

#[cfg(test)]
pub(crate) mod fixtures;
