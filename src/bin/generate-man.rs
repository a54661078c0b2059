// Writes man pages for `ow` and each subcommand into the given directory

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_mangen::Man;
use owatch::cli::Cli;

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let cmd = Cli::command();
    render(&cmd, "ow", &out_dir)?;

    for sub in cmd.get_subcommands() {
        let name = format!("ow-{}", sub.get_name());
        render(sub, &name, &out_dir)?;
    }

    println!("Man pages written to {}", out_dir.display());
    Ok(())
}

fn render(cmd: &clap::Command, name: &str, out_dir: &std::path::Path) -> Result<()> {
    let mut buffer = Vec::new();
    Man::new(cmd.clone()).render(&mut buffer)?;

    let path = out_dir.join(format!("{}.1", name));
    fs::write(&path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
