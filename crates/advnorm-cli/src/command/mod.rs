use clap::{Parser, Subcommand};

use self::{generate::GenerateArg, normalize::NormalizeArg};

mod generate;
mod normalize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Normalize an advantage batch and report statistics
    Normalize(#[clap(flatten)] NormalizeArg),
    /// Generate a synthetic advantage batch for experimentation
    Generate(#[clap(flatten)] GenerateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Normalize(arg) => normalize::run(&arg)?,
        Mode::Generate(arg) => generate::run(&arg)?,
    }
    Ok(())
}
