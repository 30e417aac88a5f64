#![deny(unsafe_code)]
//! CLI binary for the genart generators.
//!
//! Subcommands:
//! - `render <generator>`: generate an artwork and write a PNG
//! - `list`: print available generators and their document extensions
//! - `schema <generator>`: print a generator's parameter schema

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use genart_core::{CancelToken, Generator};
use genart_engines::{load_document, save_document, GeneratorKind};
use log::info;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "genart", about = "Generative art CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an artwork and write a PNG.
    Render {
        /// Generator name (e.g. "nebula"). Taken from the document with --load.
        generator: Option<String>,

        /// Canvas width in pixels.
        #[arg(short = 'W', long, default_value_t = 512)]
        width: usize,

        /// Canvas height in pixels.
        #[arg(short = 'H', long, default_value_t = 512)]
        height: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Generator parameters as a JSON object; missing keys keep defaults.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Saved document to reproduce (generator, size, seed and params).
        #[arg(long)]
        load: Option<PathBuf>,

        /// Also save the run as a document; the generator's extension is applied.
        #[arg(long)]
        save: Option<PathBuf>,

        /// Cancel the run after this many milliseconds; nothing is written.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// List available generators.
    List,
    /// Print the parameter schema and current defaults of a generator.
    Schema {
        /// Generator name.
        generator: String,
    },
}

struct RenderRequest {
    generator: GeneratorKind,
    width: usize,
    height: usize,
    seed: u64,
}

fn resolve(
    generator: Option<String>,
    width: usize,
    height: usize,
    seed: u64,
    params: &str,
    load: Option<PathBuf>,
) -> Result<RenderRequest, CliError> {
    if let Some(path) = load {
        if params.trim() != "{}" {
            return Err(CliError::params_with_load());
        }
        let (loaded, doc) = load_document(&path)?;
        if let Some(name) = generator.filter(|n| n != loaded.name()) {
            return Err(CliError::document_mismatch(&path, loaded.name(), &name));
        }
        return Ok(RenderRequest {
            generator: loaded,
            width: doc.width,
            height: doc.height,
            seed: doc.seed,
        });
    }

    let name = generator
        .ok_or_else(CliError::missing_generator)?;
    let params: Value = serde_json::from_str(params)
        .map_err(CliError::bad_params)?;
    if !params.is_object() {
        return Err(CliError::Input("--params must be a JSON object".to_string()));
    }
    Ok(RenderRequest {
        generator: GeneratorKind::from_name(&name, &params)?,
        width,
        height,
        seed,
    })
}

/// Fires `cancel` after `ms` milliseconds from a detached thread.
fn arm_timeout(cancel: &CancelToken, ms: u64) {
    let cancel = cancel.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(ms));
        cancel.cancel();
    });
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let generators: Vec<Value> = GeneratorKind::list_generators()
                .iter()
                .map(|name| {
                    GeneratorKind::from_name(name, &json!({}))
                        .map(|g| json!({"name": name, "extension": g.extension()}))
                })
                .collect::<Result<_, _>>()?;
            if cli.json {
                let info = json!({ "generators": generators });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Generators:");
                for g in &generators {
                    let name = g["name"].as_str().unwrap_or_default();
                    let extension = g["extension"].as_str().unwrap_or_default();
                    println!("  {name:<8} .{extension}");
                }
            }
        }
        Command::Schema { generator } => {
            let generator = GeneratorKind::from_name(&generator, &json!({}))?;
            let info = json!({
                "generator": generator.name(),
                "extension": generator.extension(),
                "schema": generator.param_schema(),
                "defaults": generator.params(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Render {
            generator,
            width,
            height,
            seed,
            params,
            output,
            load,
            save,
            timeout_ms,
        } => {
            let request = resolve(generator, width, height, seed, &params, load)?;
            let RenderRequest {
                generator,
                width,
                height,
                seed,
            } = request;

            let cancel = CancelToken::new();
            if let Some(ms) = timeout_ms {
                arm_timeout(&cancel, ms);
            }

            let pixels = match generator.render(width, height, seed, &cancel) {
                Ok(pixels) => pixels,
                Err(e) if e.is_cancellation() => {
                    info!("{} run cancelled; nothing written", generator.name());
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&json!({"cancelled": true}))?);
                    }
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            genart_engines::snapshot::write_png(&pixels, &output)?;

            let saved = match save {
                Some(path) => {
                    let doc = generator.document(width, height, seed);
                    Some(save_document(&generator, &doc, &path)?)
                }
                None => None,
            };

            if cli.json {
                let info = json!({
                    "generator": generator.name(),
                    "width": width,
                    "height": height,
                    "seed": seed,
                    "output": output.display().to_string(),
                    "document": saved.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({width}x{height}, seed {seed}) -> {}",
                    generator.name(),
                    output.display()
                );
                if let Some(path) = saved {
                    eprintln!("saved document -> {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
