//! Cross-crate scenario tests for the discovery and bootstrap engine.

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod support;
