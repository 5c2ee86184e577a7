//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (fixed header)
//!
//! ```text
//! ┌──────────┬────────────┬──────────────────────┐
//! │ Cmd (1)  │ Nbytes (4) │ Filename (59)        │  + optional payload
//! └──────────┴────────────┴──────────────────────┘
//! ```
//!
//! `nbytes` is big endian (network order) on the wire and host order in
//! [`Header`].
//!
//! ### Exchanges
//! | Request       | Success            | Failure        |
//! |---------------|--------------------|----------------|
//! | LS            | LSOUT + listing    | NAK(errno)     |
//! | PUT + bytes   | ACK                | NAK(errno)     |
//! | GET           | FILEOUT + bytes    | NAK(errno)     |
//! | RM            | ACK                | NAK(errno)     |

mod command;
mod header;
mod codec;

pub use command::Command;
pub use header::{decode_header, encode_header, Header, FILENAME_SIZE, HEADER_SIZE};
pub use codec::{read_header, read_payload, write_frame, write_header};
