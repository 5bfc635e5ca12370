pub mod config;
pub mod daemon;
pub mod logging;
pub mod repository;
pub mod sync;

#[cfg(test)]
mod test_support;
