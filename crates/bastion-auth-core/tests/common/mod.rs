//! Common test utilities for bastion-auth-core integration tests

pub mod log_capture;
pub mod mock_directory;

#[allow(unused_imports)]
pub use log_capture::LogCapture;
#[allow(unused_imports)]
pub use mock_directory::{test_config, MockDirectory, ISSUER, SECRET};
