//! Renders `cilia(1)` plus one page per subcommand into `$OUT_DIR/man`.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;

#[path = "src/cli.rs"]
#[allow(dead_code)]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let man_dir = std::env::var_os("OUT_DIR")
        .map(|out| PathBuf::from(out).join("man"))
        .ok_or_else(|| io::Error::other("cargo did not set OUT_DIR"))?;
    std::fs::create_dir_all(&man_dir)?;

    clap_mangen::generate_to(cli::Cli::command(), &man_dir)
}
