mod client;
mod config;
mod error;
mod events;
mod manager;
mod media;
mod reactions;
mod session;
mod signaling;
mod transport;

pub use client::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use manager::*;
pub use media::*;
pub use reactions::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
