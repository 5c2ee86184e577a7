//! Command definitions
//!
//! The closed set of command codes carried in every header.

use std::fmt;

use crate::error::RfxError;

/// Command codes
///
/// Requests travel client to server, responses server to client.
/// `HELP` and `EXIT` exist only inside the client and are never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Error = 0x00,
    Exit = 0x01,
    Get = 0x02,
    Help = 0x03,
    Ls = 0x04,
    Put = 0x05,
    Rm = 0x06,
    FileOut = 0x07,
    LsOut = 0x08,
    Ack = 0x09,
    Nak = 0x0A,
}

impl Command {
    /// Symbolic name as rendered in logs
    pub fn name(self) -> &'static str {
        match self {
            Command::Error => "ERROR",
            Command::Exit => "EXIT",
            Command::Get => "GET",
            Command::Help => "HELP",
            Command::Ls => "LS",
            Command::Put => "PUT",
            Command::Rm => "RM",
            Command::FileOut => "FILEOUT",
            Command::LsOut => "LSOUT",
            Command::Ack => "ACK",
            Command::Nak => "NAK",
        }
    }

    /// Wire code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Requests a client may put on the wire
    pub fn is_request(self) -> bool {
        matches!(self, Command::Ls | Command::Put | Command::Get | Command::Rm)
    }

    /// Commands only a server sends
    pub fn is_response(self) -> bool {
        matches!(
            self,
            Command::LsOut | Command::FileOut | Command::Ack | Command::Nak | Command::Error
        )
    }

    /// Whether the request names a file in the header
    pub fn takes_filename(self) -> bool {
        matches!(self, Command::Put | Command::Get | Command::Rm)
    }

    /// The one response that means the request succeeded
    pub fn success_response(self) -> Option<Command> {
        match self {
            Command::Ls => Some(Command::LsOut),
            Command::Get => Some(Command::FileOut),
            Command::Put | Command::Rm => Some(Command::Ack),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = RfxError;

    fn try_from(code: u8) -> Result<Self, RfxError> {
        let command = match code {
            0x00 => Command::Error,
            0x01 => Command::Exit,
            0x02 => Command::Get,
            0x03 => Command::Help,
            0x04 => Command::Ls,
            0x05 => Command::Put,
            0x06 => Command::Rm,
            0x07 => Command::FileOut,
            0x08 => Command::LsOut,
            0x09 => Command::Ack,
            0x0A => Command::Nak,
            _ => {
                return Err(RfxError::Protocol(format!(
                    "Unknown command code: 0x{:02x}",
                    code
                )))
            }
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
