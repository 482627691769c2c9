use crate::error::{Result, ScraperError};
use std::io::{self, BufRead, Write};

/// How the pipeline reacts to a condition it cannot resolve on its own
/// (unparseable date, undecodable classifier verdict, failing fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Degrade gracefully and keep going.
    Unattended,
    /// Pause and let the operator decide whether to continue.
    Interactive,
}

impl FaultPolicy {
    /// In interactive mode, block on stdin until the operator answers;
    /// entering 'n' aborts the run. Unattended mode continues immediately.
    pub fn confirm_continue(&self, message: &str) -> Result<()> {
        match self {
            FaultPolicy::Unattended => Ok(()),
            FaultPolicy::Interactive => {
                println!("{message}");
                print!("To abort the run, enter 'n'. Press Enter to continue: ");
                io::stdout().flush()?;
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
                if line.trim().eq_ignore_ascii_case("n") {
                    return Err(ScraperError::Aborted);
                }
                Ok(())
            }
        }
    }
}
