//! TransferSession — the stop-and-wait block acknowledgment state machine.
//!
//! Sans-I/O: the session consumes raw datagrams and hands back the bytes of
//! the next outgoing control message. The caller owns the socket and the
//! sink, and must send each reply before receiving again — the protocol
//! allows at most one message in flight.

use bytes::Bytes;

use crate::codec::{self, CodecError, Decoded};
use crate::wire;

/// Default bound on NACK retries per block before the transfer is abandoned.
pub const DEFAULT_MAX_RETRIES: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Requesting,
    AwaitingBlock,
    Done,
    Failed,
}

/// One file download in progress.
pub struct TransferSession {
    file: String,
    noisy: bool,
    max_retries: u32,
    retries: u32,
    state: State,
}

/// What the caller must do next after feeding the session a datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A corrected block to append to the sink. `ack` is `None` on the final
    /// block, which ends the transfer without a trailing acknowledgment.
    Deliver {
        block: u16,
        data: Bytes,
        ack: Option<Bytes>,
        last: bool,
    },
    /// The block was uncorrectable; send the NACK and wait for the resend.
    Nack { block: u16, reply: Bytes },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Malformed datagram or protocol violation. Fatal.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The server reported an error. Terminal, message verbatim.
    #[error("server error {code}: {message}")]
    Server { code: u16, message: String },
    /// A block stayed uncorrectable past the configured retry bound.
    #[error("block {block} still uncorrectable after {attempts} attempts")]
    RetriesExhausted { block: u16, attempts: u32 },
    /// `handle` was called before the request was sent or after the
    /// transfer ended.
    #[error("session is not awaiting a block")]
    NotAwaiting,
}

impl TransferSession {
    pub fn new(file: impl Into<String>, noisy: bool, max_retries: u32) -> Self {
        Self {
            file: file.into(),
            noisy,
            max_retries,
            retries: 0,
            state: State::Requesting,
        }
    }

    /// The read request datagram that opens the transfer.
    pub fn request(&mut self) -> Bytes {
        self.state = State::AwaitingBlock;
        wire::read_request(&self.file, self.noisy)
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Feed one received datagram through the codec and advance the state
    /// machine. Every `Err` is terminal.
    pub fn handle(&mut self, raw: &[u8]) -> Result<Step, SessionError> {
        if self.state != State::AwaitingBlock {
            return Err(SessionError::NotAwaiting);
        }

        match codec::decode(raw) {
            Ok(Decoded::Block {
                block, data, last, ..
            }) => {
                self.retries = 0;
                let ack = if last {
                    self.state = State::Done;
                    None
                } else {
                    Some(wire::ack(block))
                };
                Ok(Step::Deliver {
                    block,
                    data,
                    ack,
                    last,
                })
            }
            Ok(Decoded::Corrupt { block }) => {
                self.retries += 1;
                if self.retries > self.max_retries {
                    self.state = State::Failed;
                    return Err(SessionError::RetriesExhausted {
                        block,
                        attempts: self.retries,
                    });
                }
                Ok(Step::Nack {
                    block,
                    reply: wire::nack(block),
                })
            }
            Ok(Decoded::ServerError { code, message }) => {
                self.state = State::Failed;
                Err(SessionError::Server { code, message })
            }
            Err(e) => {
                self.state = State::Failed;
                Err(SessionError::Codec(e))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
