pub mod auth;
pub mod categories;
pub mod init;
pub mod projects;
pub mod screenshots;
pub mod technologies;

use std::io::{self, Write};

use crate::error::Result;

/// Print `question` and read one trimmed line from stdin.
pub fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Ask a yes/no question; anything but "y" is a no.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{question} [y/N] "))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}
