//! Tools for turning ring-and-radial diagrams into blocks, bundled as a single executable.

#[macro_use]
extern crate log;

mod polygonize;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use structopt::StructOpt;

use block_model::DiagramConfig;

#[derive(StructOpt)]
#[structopt(name = "blockcli", about = "Polygonizes concentric road diagrams")]
enum Command {
    /// Builds every block of a diagram and writes them as GeoJSON
    Polygonize {
        /// The path to a JSON diagram, in the format `synthetic` writes
        #[structopt(long)]
        input: String,
        /// The path to a JSON config. The reference diagram's config is used if omitted.
        #[structopt(long)]
        config: Option<String>,
        /// Generate straight radials for any times the diagram is missing
        #[structopt(long)]
        fill_missing_radials: bool,
        /// The GeoJSON file to write
        #[structopt(long)]
        output: String,
        /// Also write every block, with its full boundary and diagnostics, as JSON here
        #[structopt(long)]
        json: Option<String>,
    },
    /// Writes a clean diagram matching a config, useful as a template or for testing
    Synthetic {
        /// The path to a JSON config. The reference diagram's config is used if omitted.
        #[structopt(long)]
        config: Option<String>,
        /// The JSON file to write
        #[structopt(long)]
        output: String,
    },
    /// Prints the reference diagram's config as JSON
    DumpConfig,
}

fn main() -> Result<()> {
    let cmd = Command::from_args();

    // The output of this one might get piped somewhere
    if !matches!(cmd, Command::DumpConfig) {
        abstutil::logger::setup();
    }

    match cmd {
        Command::Polygonize {
            input,
            config,
            fill_missing_radials,
            output,
            json,
        } => polygonize::run(
            input,
            load_config(config)?,
            fill_missing_radials,
            output,
            json,
        )?,
        Command::Synthetic { config, output } => {
            let spec = block_model::reference_diagram(&load_config(config)?)?;
            write_json(&output, &spec)?;
        }
        Command::DumpConfig => println!("{}", to_json(&DiagramConfig::default())?),
    }
    Ok(())
}

fn load_config(path: Option<String>) -> Result<DiagramConfig> {
    let cfg = match path {
        Some(path) => read_json(&path)?,
        None => DiagramConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let contents = fs_err::read_to_string(path)?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path))
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    fs_err::write(path, to_json(value)?)?;
    info!("Wrote {}", path);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
