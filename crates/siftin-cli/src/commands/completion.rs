use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    write_script(shell, cmd, &mut io::stdout().lock())
}

/// Write the completion script for `shell` into `out`
pub fn write_script(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let bin_name = cmd.get_bin_name().unwrap_or(cmd.get_name()).to_string();
    generate(shell, cmd, bin_name, out);
    out.flush()?;
    Ok(())
}
