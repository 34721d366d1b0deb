use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vitrine",
    author,
    version,
    about = "Interactive GLSL shader viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Catalogue entry to start on; defaults to the catalogue's default entry.
    #[arg(value_name = "ID")]
    pub shader: Option<String>,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_surface_size,
        default_value = "1280x720"
    )]
    pub size: (u32, u32),

    /// Load entries from a catalogue directory instead of the built-in set.
    #[arg(long, value_name = "DIR")]
    pub catalogue: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List catalogue entries and exit.
    List,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{w}'"))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be non-zero".to_string());
    }
    Ok((width, height))
}
