pub use adieu_core::model::{ConnectionId, RoomId};

pub mod model {
    pub use adieu_core::model::*;
}

pub mod utils {
    pub use adieu_core::utils::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use adieu_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use adieu_client::*;
}
