//! Reassembles raw markup lines into one logical line per tag.

use crate::{Error, Result};

/// Join physical lines so that every returned line starts with `<`.
///
/// Leading spaces are stripped from each physical line. A line that then
/// starts with `<` opens a new logical line; any other line is appended to
/// the previous logical line after a newline. Empty lines before the first
/// tag are dropped.
///
/// # Errors
/// Returns [`Error::Parse`] if text appears before the first tag.
pub fn normalize_lines<'a, I>(raw: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut logical: Vec<String> = Vec::new();

    for (number, line) in raw.into_iter().enumerate() {
        let line = line.trim_start_matches(' ');
        if line.starts_with('<') {
            logical.push(line.to_string());
            continue;
        }
        match logical.last_mut() {
            Some(current) => {
                current.push('\n');
                current.push_str(line);
            }
            None if line.trim().is_empty() => {}
            None => {
                return Err(Error::Parse {
                    line: number + 1,
                    message: "content before the first tag".to_string(),
                })
            }
        }
    }

    Ok(logical)
}
