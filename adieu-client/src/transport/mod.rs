mod media_connection;
mod transport_event;
mod webrtc_connection;

pub use media_connection::*;
pub use transport_event::*;
pub use webrtc_connection::*;
