//! Console Session
//!
//! Reads commands, prompts for their fields and prints responses.

use std::io::{BufRead, ErrorKind, Write};

use crate::engine::Engine;
use crate::error::{LinkError, Result};
use crate::protocol::{Command, CommandType, Response};
use crate::record::{MasterField, MasterRecord, SlaveField, SlaveRecord};

/// An interactive session bound to one engine
pub struct Session<'e, R, W> {
    /// Engine the commands run against
    engine: &'e mut Engine,

    /// Command and field input
    input: R,

    /// Prompts and responses
    output: W,
}

impl<'e, R: BufRead, W: Write> Session<'e, R, W> {
    /// Create a new session
    pub fn new(engine: &'e mut Engine, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
        }
    }

    /// Run the command loop (blocking until `exit` or end of input)
    ///
    /// Returns an error only if the console itself fails; operation
    /// errors are printed and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        loop {
            write!(self.output, "\nEnter command ({}): ", Self::command_list())?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                tracing::debug!("Input closed");
                return Ok(());
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command_type = match line.parse::<CommandType>() {
                Ok(t) => t,
                Err(_) => {
                    writeln!(self.output, "Unknown command.")?;
                    continue;
                }
            };
            if command_type == CommandType::Exit {
                return Ok(());
            }

            tracing::trace!(command = %command_type, "Received command");

            match self.dispatch(command_type) {
                Ok(response) => writeln!(self.output, "{}", response)?,
                Err(LinkError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    tracing::debug!(command = %command_type, "Input closed mid-command");
                    return Ok(());
                }
                Err(e) => {
                    if e.is_recoverable() {
                        tracing::debug!(command = %command_type, error = %e, "Command rejected");
                    } else {
                        tracing::warn!(command = %command_type, error = %e, "Command failed");
                    }
                    writeln!(self.output, "Error: {}", e)?;
                }
            }
        }
    }

    /// Gather the arguments for `command_type` and execute it
    fn dispatch(&mut self, command_type: CommandType) -> Result<Response> {
        let command = match command_type {
            CommandType::GetMaster => Command::GetMaster {
                key: self.prompt_i32("Enter Phone")?,
            },
            CommandType::GetSlave => Command::GetSlave {
                key: self.prompt_i32("Enter Phone")?,
                isbn: self.prompt_i32("Enter ISBN")?,
            },
            CommandType::DeleteMaster => Command::DeleteMaster {
                key: self.prompt_i32("Enter Phone to delete")?,
            },
            CommandType::DeleteSlave => Command::DeleteSlave {
                key: self.prompt_i32("Enter Phone for book deletion")?,
                isbn: self.prompt_i32("Enter ISBN of the book to delete")?,
            },
            CommandType::UpdateMaster => {
                let key = self.prompt_i32("Enter Phone to update")?;
                self.engine.get_master(key)?;
                let field = MasterField::from_choice(
                    self.prompt_choice("Select field to update:\n1. Name\n2. Address\nChoice")?,
                )?;
                let value = self.prompt(&format!("Enter new {}", field.label()))?;
                Command::UpdateMaster {
                    key,
                    update: field.with_value(&value)?,
                }
            }
            CommandType::UpdateSlave => {
                let key = self.prompt_i32("Enter Buyer Phone for book update")?;
                let isbn = self.prompt_i32("Enter ISBN of book to update")?;
                self.engine.get_slave(key, isbn)?;
                let field = SlaveField::from_choice(
                    self.prompt_choice("Select field to update:\n1. Title\n2. Author\n3. Price\nChoice")?,
                )?;
                let value = self.prompt(&format!("Enter new {}", field.label()))?;
                Command::UpdateSlave {
                    key,
                    isbn,
                    update: field.with_value(&value)?,
                }
            }
            CommandType::InsertMaster => {
                let key = self.prompt_i32("Enter Phone")?;
                let name = self.prompt("Enter Name")?;
                let address = self.prompt("Enter Address")?;
                Command::InsertMaster {
                    record: MasterRecord::new(key, name, address)?,
                }
            }
            CommandType::InsertSlave => {
                let key = self.prompt_i32("Enter Buyer Phone")?;
                self.engine.get_master(key)?;
                let isbn = self.prompt_i32("Enter ISBN")?;
                let title = self.prompt("Enter Title")?;
                let author = self.prompt("Enter Author")?;
                let price = self.prompt_f64("Enter Price")?;
                Command::InsertSlave {
                    key,
                    record: SlaveRecord::new(key, isbn, title, author, price)?,
                }
            }
            CommandType::CountMasters => Command::CountMasters,
            CommandType::CountSlaves => Command::CountSlaves,
            CommandType::DumpMasters => Command::DumpMasters,
            CommandType::DumpSlaves => Command::DumpSlaves,
            CommandType::Check => Command::Check,
            CommandType::Exit => {
                return Err(LinkError::InvalidValue("`exit` is handled by the command loop".into()))
            }
        };

        self.engine.execute(command)
    }

    // =========================================================================
    // Input Helpers
    // =========================================================================

    /// Read one line without its terminator; `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Print `label` and read the answer
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        self.read_line()?
            .map(|s| s.trim().to_string())
            .ok_or_else(|| LinkError::Io(std::io::Error::new(ErrorKind::UnexpectedEof, "input closed")))
    }

    fn prompt_i32(&mut self, label: &str) -> Result<i32> {
        let raw = self.prompt(label)?;
        raw.parse()
            .map_err(|_| LinkError::InvalidValue(format!("`{}` is not an integer", raw)))
    }

    fn prompt_f64(&mut self, label: &str) -> Result<f64> {
        let raw = self.prompt(label)?;
        raw.parse()
            .map_err(|_| LinkError::InvalidValue(format!("`{}` is not a number", raw)))
    }

    /// Read a field choice as typed; range checks belong to the field type
    fn prompt_choice(&mut self, label: &str) -> Result<u8> {
        let raw = self.prompt(label)?;
        raw.parse()
            .map_err(|_| LinkError::InvalidValue(format!("`{}` is not a field number", raw)))
    }

    fn command_list() -> String {
        CommandType::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
