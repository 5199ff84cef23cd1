pub mod cli;
pub mod colors;
pub mod error;
pub mod fetch;
pub mod installer;
pub mod manifest;
pub mod resolver;
#[cfg(test)]
pub mod tests;
