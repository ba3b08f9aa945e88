//! Command implementations

pub mod doctor;
pub mod env;
pub mod poll;
pub mod retry;
pub mod version;

use anyhow::{Result, bail};

use crate::domain::Command;

/// Build a [`Command`] from trailing CLI words (`-- program arg...`).
///
/// # Errors
///
/// Returns an error if `words` is empty.
pub fn command_from_words(words: &[String]) -> Result<Command> {
    let Some((program, args)) = words.split_first() else {
        bail!("no command given; pass it after `--`");
    };
    Ok(Command::new(program.as_str()).args(args))
}
