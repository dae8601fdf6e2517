//! Waypoint library exports for the binary and integration tests

pub mod core;

#[cfg(test)]
pub mod test_support;
