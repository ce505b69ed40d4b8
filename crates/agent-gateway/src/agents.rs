pub mod base;
pub mod project;

#[cfg(test)]
pub mod mock;
