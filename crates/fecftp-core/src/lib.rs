//! fecftp-core — wire format, FEC codec, and transfer session state machine.
//! Nothing in this crate performs I/O; the client binary crate drives it.

pub mod codec;
pub mod config;
pub mod fec;
pub mod session;
pub mod wire;

pub use codec::{decode, CodecError, Decoded};
pub use session::{SessionError, Step, TransferSession};
