//! Console I/O for the two interactive system calls.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Where `SYS 0 1` output goes and where `SYS 0 2` input comes from.
pub trait Console {
    /// Print one value popped by `SYS 0 1`.
    fn write_value(&mut self, value: i32) -> io::Result<()>;

    /// Block until one integer is available for `SYS 0 2`.
    fn read_value(&mut self) -> io::Result<i32>;
}

/// Line-oriented console over any reader/writer pair.
///
/// Input is read as whitespace-separated tokens, so several integers may
/// share one line.
pub struct StdConsole<R, W> {
    reader: R,
    writer: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            pending: VecDeque::new(),
        }
    }

    /// Consume the console, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn next_token(&mut self) -> io::Result<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "end of input while reading an integer",
                ));
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn write_value(&mut self, value: i32) -> io::Result<()> {
        writeln!(self.writer, "Top of Stack Value: {value}")
    }

    fn read_value(&mut self) -> io::Result<i32> {
        write!(self.writer, "Please Enter an Integer: ")?;
        self.writer.flush()?;
        let token = self.next_token()?;
        token.parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{token}' is not an integer"),
            )
        })
    }
}

/// Console fed from a fixed input queue that records everything printed.
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    inputs: VecDeque<i32>,
    outputs: Vec<i32>,
}

impl ScriptedConsole {
    pub fn new(inputs: impl IntoIterator<Item = i32>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
        }
    }

    /// Values printed so far, in order.
    pub fn outputs(&self) -> &[i32] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<i32> {
        self.outputs
    }
}

impl Console for ScriptedConsole {
    fn write_value(&mut self, value: i32) -> io::Result<()> {
        self.outputs.push(value);
        Ok(())
    }

    fn read_value(&mut self) -> io::Result<i32> {
        self.inputs.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input left")
        })
    }
}
