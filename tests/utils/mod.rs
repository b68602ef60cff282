pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::ScoreAssertion;
#[allow(unused_imports)]
pub use setup::{TestApp, TestResponse, TestSetup, TestSetupBuilder};
