//! Operator confirmation before uploads start

use std::io::{self, BufRead, Write};

/// Yes/no gate in front of the dispatch phase
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

/// Asks on stdin/stdout
pub struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        ask_yes_no(&mut stdin.lock(), &mut stdout.lock(), message)
    }
}

/// Always confirms (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Print `message`, ask "Continue? (y/n)" and read one line.
/// Anything other than y/yes declines, including end of input.
pub fn ask_yes_no<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
) -> io::Result<bool> {
    writeln!(writer, "{}", message)?;
    write!(writer, "Continue? (y/n): ")?;
    writer.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
