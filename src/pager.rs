//! Output through an optional pager command.

use std::{
    io::Write,
    process::{Command, Stdio},
};

use crate::error::{Error, Result};

/// Write output either directly to stdout or through a pager command.
pub fn write_output(output: &str, pager: Option<&str>) -> Result<()> {
    if output.is_empty() {
        return Ok(());
    }

    let Some(pager) = pager else {
        print!("{output}");
        return Ok(());
    };

    let mut parts = shell_words::split(pager).map_err(|error| Error::PagerParse {
        message: error.to_string(),
    })?;
    let program = parts.first().cloned().ok_or_else(|| Error::PagerParse {
        message: "pager command is empty".to_string(),
    })?;
    let args = parts.split_off(1);

    let mut child = Command::new(&program)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|error| Error::PagerSpawn {
            pager: program.clone(),
            source: error,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(output.as_bytes())
            .map_err(|error| Error::PagerWrite {
                pager: program.clone(),
                source: error,
            })?;
    }

    let status = child.wait().map_err(|error| Error::PagerSpawn {
        pager: program.clone(),
        source: error,
    })?;

    if !status.success() {
        return Err(Error::PagerStatus {
            pager: program,
            status,
        });
    }

    Ok(())
}
