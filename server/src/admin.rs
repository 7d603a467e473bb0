use crate::server_state::RelayStatus;
use tokio::sync::oneshot::Sender;

#[derive(Debug)]
pub enum AdminCommand {
    GetStatus { tx: Sender<RelayStatus> },
    /// Clears the canvas for everyone and answers with the resulting status.
    Reset { tx: Sender<RelayStatus> },
}
