pub extern crate bincode;
pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;

mod client_sync_agent;
mod codec;
mod message;
mod pointer;
mod render_state;
mod session_log;
mod throttle;
mod traits;
mod types;

pub use client_sync_agent::*;
pub use codec::*;
pub use message::*;
pub use pointer::*;
pub use render_state::*;
pub use session_log::*;
pub use throttle::*;
pub use traits::*;
pub use types::*;
