//! Listing facility
//!
//! Runs an external program (by default `ls -l`) and captures what it
//! prints.

use std::io::{self, ErrorKind, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// An external listing program and its arguments
#[derive(Debug, Clone)]
pub struct ListingCommand {
    program: String,
    args: Vec<String>,
}

impl ListingCommand {
    /// Build from `[program, args...]`
    pub fn new(argv: &[String]) -> io::Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "empty listing command"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Run inside `dir`, returning stdout followed by stderr
    ///
    /// Failing to start the program is an error; a non-zero exit status is
    /// only logged and the captured text is still returned.
    pub fn run(&self, dir: &Path) -> io::Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr on its own thread so a chatty program can't fill one
        // pipe while we block reading the other
        let mut stderr = child.stderr.take();
        let stderr_reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(stderr) = stderr.as_mut() {
                stderr.read_to_end(&mut buf)?;
            }
            Ok::<_, io::Error>(buf)
        });

        // Reap the child and join the reader on every path; stdout is
        // dropped first so a failed read can't leave the child blocked
        let mut output = Vec::new();
        let read = match child.stdout.take() {
            Some(mut stdout) => stdout.read_to_end(&mut output).map(drop),
            None => Ok(()),
        };
        let status = child.wait();
        let stderr = stderr_reader.join();

        read?;
        let status = status?;
        match stderr {
            Ok(Ok(err)) => output.extend_from_slice(&err),
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(io::Error::new(ErrorKind::Other, "stderr reader panicked")),
        }

        if status.success() {
            tracing::debug!("{}: exit 0, {} bytes", self, output.len());
        } else {
            tracing::warn!("{}: {}", self, status);
        }
        Ok(output)
    }
}

impl std::fmt::Display for ListingCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
