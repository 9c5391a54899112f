mod negotiation_state;
mod remote_session;
mod session_task;

pub use negotiation_state::*;
pub use remote_session::*;
pub use session_task::*;
