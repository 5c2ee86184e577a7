//! Client Session Loop
//!
//! Reads one command per line, checks its arguments locally, and runs it
//! against the server.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{Result, RfxError};
use super::Client;

/// Usage summary printed by `help`
pub const HELP: &str = "\
exit         - Exit the program.  Equivalent to EOF.
get filename - Copy remote file to local host.
help         - Print help summary.
ls           - List names of files on remote server.
put filename - Copy local file to remote host.
rm filename  - Remove file from remote server.
";

/// A command typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Help,
    Exit,
    Ls,
    Put(String),
    Get(String),
    Rm(String),
}

/// Parse one input line
///
/// Blank lines yield `None`. Unknown commands and wrong argument counts are
/// `Usage` errors.
pub fn parse_line(line: &str) -> Result<Option<UserCommand>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (name, args) {
        ("help", []) => UserCommand::Help,
        ("exit", []) => UserCommand::Exit,
        ("ls", []) => UserCommand::Ls,
        ("put", [file]) => UserCommand::Put(file.to_string()),
        ("get", [file]) => UserCommand::Get(file.to_string()),
        ("rm", [file]) => UserCommand::Rm(file.to_string()),
        ("help", _) => return Err(usage("HELP usage: help")),
        ("exit", _) => return Err(usage("EXIT usage: exit")),
        ("ls", _) => return Err(usage("LS usage: ls")),
        ("put", _) => return Err(usage("PUT usage: put {filename}")),
        ("get", _) => return Err(usage("GET usage: get {filename}")),
        ("rm", _) => return Err(usage("RM usage: rm {filename}")),
        (other, _) => return Err(usage(&format!("{}: invalid command", other))),
    };
    Ok(Some(command))
}

fn usage(msg: &str) -> RfxError {
    RfxError::Usage(msg.to_string())
}

/// Interactive session over a connected client
pub struct Session<R, W> {
    client: Client,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(client: Client, input: R, output: W) -> Self {
        Self {
            client,
            input,
            output,
        }
    }

    /// Run until `exit`, end of input, or a fatal transport error
    pub fn run(&mut self) -> Result<()> {
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if self.input.read_until(b'\n', &mut raw)? == 0 {
                tracing::debug!("end of input");
                break;
            }

            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line,
                Err(_) => {
                    tracing::warn!(
                        "{}: input is not valid UTF-8",
                        String::from_utf8_lossy(&raw).trim_end()
                    );
                    continue;
                }
            };

            let command = match parse_line(line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("{}", e);
                    continue;
                }
            };

            if command == UserCommand::Exit {
                break;
            }

            if let Err(e) = self.execute(&command) {
                if e.is_fatal() {
                    tracing::error!("{}", e);
                    return Err(e);
                }
                tracing::warn!("{}", e);
            }
        }

        self.client.close();
        Ok(())
    }

    /// Run one parsed command
    pub fn execute(&mut self, command: &UserCommand) -> Result<()> {
        match command {
            UserCommand::Help => self.output.write_all(HELP.as_bytes())?,
            UserCommand::Exit => {}
            UserCommand::Ls => {
                let listing = self.client.ls()?;
                tracing::info!("received {} bytes", listing.len());
                self.output.write_all(&listing)?;
                self.output.flush()?;
            }
            UserCommand::Put(file) => {
                let sent = self.client.put(Path::new(file), file)?;
                tracing::info!("sent {} bytes", sent);
            }
            UserCommand::Get(file) => {
                let received = self.client.get(file, Path::new(file))?;
                tracing::info!("wrote {} bytes", received);
            }
            UserCommand::Rm(file) => {
                self.client.rm(file)?;
                tracing::info!("removed {}", file);
            }
        }
        Ok(())
    }

    /// Give back the client, e.g. to inspect or reuse the connection
    pub fn into_client(self) -> Client {
        self.client
    }
}
