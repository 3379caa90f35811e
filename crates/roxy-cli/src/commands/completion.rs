use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

/// Print the completion script for `shell` to stdout
pub fn execute(shell: Shell, mut cmd: Command) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_script(shell, &mut cmd, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn write_script(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let bin_name = cmd
        .get_bin_name()
        .unwrap_or_else(|| cmd.get_name())
        .to_string();
    generate(shell, cmd, bin_name, out);
    Ok(())
}
