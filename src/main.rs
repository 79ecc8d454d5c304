// SPDX-License-Identifier: MIT
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};
use tracing::info;
use tracing_subscriber::EnvFilter;

use resource_bundle::{encode_bundle, BundleCodec, CodecConfig};

#[derive(Parser)]
#[command(name = "resbundle", version, about = "Unpack and repack binary resource bundles")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a binary bundle into a text directory
    Unpack {
        input: PathBuf,
        output: PathBuf,
        /// Bundle name (defaults to the input file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Convert a text directory back into a binary bundle
    Pack {
        input: PathBuf,
        output: PathBuf,
        /// Name used to locate the manifest (defaults to the output file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Round-trip a binary bundle through text and compare digests
    Verify {
        input: PathBuf,
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },
    /// Print bundle statistics
    Inspect {
        input: PathBuf,
        /// Dump the whole bundle as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_name(name: Option<String>, path: &Path) -> anyhow::Result<String> {
    if let Some(name) = name {
        return Ok(name);
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a bundle name from {}", path.display()))
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn verify(codec: &BundleCodec, input: &Path, work_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let name = default_name(None, input)?;
    let original = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    let bundle = codec.read_binary(&name, input)?;

    let temp_dir;
    let dir = match work_dir {
        Some(dir) => dir,
        None => {
            temp_dir = tempfile::tempdir().context("creating temporary directory")?;
            temp_dir.path().to_path_buf()
        }
    };

    codec.write_text(&bundle, &dir)?;
    let reread = codec.read_text(&dir, &name)?;
    let repacked = encode_bundle(&reread)?;

    let before = sha256_hex(&original);
    let after = sha256_hex(&repacked);
    info!("original sha256={} repacked sha256={}", before, after);

    if before != after {
        bail!(
            "round trip changed {}: {} bytes ({}) became {} bytes ({})",
            input.display(),
            original.len(),
            before,
            repacked.len(),
            after
        );
    }

    println!("{}  {} round-trips exactly", before, input.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = CodecConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;
    let codec = BundleCodec::with_config(config);

    match cli.command {
        Command::Unpack {
            input,
            output,
            name,
        } => {
            let name = default_name(name, &input)?;
            let bundle = codec.read_binary(&name, &input)?;
            let manifest = codec.write_text(&bundle, &output)?;
            println!(
                "Unpacked {} files from {} into {}",
                manifest.entries.len(),
                input.display(),
                output.display()
            );
        }
        Command::Pack {
            input,
            output,
            name,
        } => {
            let name = default_name(name, &output)?;
            let bundle = codec.read_text(&input, &name)?;
            codec.write_binary(&bundle, &output)?;
            println!(
                "Packed {} files from {} into {}",
                bundle.files.len(),
                input.display(),
                output.display()
            );
        }
        Command::Verify { input, work_dir } => verify(&codec, &input, work_dir)?,
        Command::Inspect { input, json } => {
            let name = default_name(None, &input)?;
            let bundle = codec.read_binary(&name, &input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&bundle)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&bundle.stats())?);
            }
        }
    }

    Ok(())
}
