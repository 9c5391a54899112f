pub mod mock_transport;

pub use client_harness::*;
pub use mock_media::*;
pub use mock_transport::*;
