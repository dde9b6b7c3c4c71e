//! Status literals
//!
//! The board marks each protocol phase boundary with one of these fixed
//! 16-byte ASCII messages. Hosts compare them byte-for-byte, so the
//! padding is part of the protocol.

/// Length of every status message in bytes
pub const STATUS_LEN: usize = 16;

const HELLO: &[u8; STATUS_LEN] = b"  Hello, World! ";
const WAITING: &[u8; STATUS_LEN] = b"  Waiting_CMD   ";
const COMMAND_RECEIVED: &[u8; STATUS_LEN] = b"  CMD_Receive   ";
const STORE_COMPLETE: &[u8; STATUS_LEN] = b" Store complete ";
const ENGINE_RUNNING: &[u8; STATUS_LEN] = b"Engine Run      ";
const ENGINE_COMPLETE: &[u8; STATUS_LEN] = b"Engine complete ";
const PAUSED: &[u8; STATUS_LEN] = b"      Pause     ";
const RESUMED: &[u8; STATUS_LEN] = b"     Resume     ";

/// Status messages sent by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Greeting, answer to HELLO
    Hello,
    /// Command accepted, board waits for its parameters
    Waiting,
    /// Transfer descriptor received
    CommandReceived,
    /// Block store or configuration store finished
    StoreComplete,
    /// Engine pointers programmed, start pulse follows
    EngineRunning,
    /// Engine reported completion
    EngineComplete,
    /// Pause started
    Paused,
    /// Pause finished
    Resumed,
}

impl Status {
    /// Wire bytes of this status
    pub const fn as_bytes(self) -> &'static [u8; STATUS_LEN] {
        match self {
            Status::Hello => HELLO,
            Status::Waiting => WAITING,
            Status::CommandReceived => COMMAND_RECEIVED,
            Status::StoreComplete => STORE_COMPLETE,
            Status::EngineRunning => ENGINE_RUNNING,
            Status::EngineComplete => ENGINE_COMPLETE,
            Status::Paused => PAUSED,
            Status::Resumed => RESUMED,
        }
    }

    /// Identify a received 16-byte message
    pub fn from_bytes(bytes: &[u8; STATUS_LEN]) -> Option<Self> {
        [
            Status::Hello,
            Status::Waiting,
            Status::CommandReceived,
            Status::StoreComplete,
            Status::EngineRunning,
            Status::EngineComplete,
            Status::Paused,
            Status::Resumed,
        ]
        .into_iter()
        .find(|status| status.as_bytes() == bytes)
    }
}
