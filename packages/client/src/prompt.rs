//! Name entry, before the terminal switches to raw mode.

use rustyline::{DefaultEditor, error::ReadlineError};

use crate::error::ClientError;

const NAME_PROMPT: &str = "Input your Name: ";

/// Ask for a display name on the controlling terminal.
///
/// Returns `None` when the user aborts with Ctrl+C or Ctrl+D. Blocks the
/// calling thread.
pub fn prompt_user_name() -> Result<Option<String>, ClientError> {
    let mut editor = DefaultEditor::new()?;

    match editor.readline(NAME_PROMPT) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) => {
            // Ctrl+C
            tracing::info!("Name entry interrupted");
            Ok(None)
        }
        Err(ReadlineError::Eof) => {
            // Ctrl+D
            tracing::info!("Name entry reached EOF");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
