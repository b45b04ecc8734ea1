//! stencil – command-line template compiler.
//!
//! Usage:
//!   stencil <template.json> [output.json] [--data data.json] [--blocks blocks.json]
//!
//! Loads a template document (migrating legacy versions), compiles it with
//! the supplied data and block catalog, and writes the resulting draw-call
//! stream as JSON. If `output.json` is omitted the stream is written next to
//! the input with an `.ops.json` extension.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use docstencil::backend::RecordingRenderer;
use docstencil::migrate::parse_template;
use docstencil::model::{Block, BlockCatalog, DataMap};
use docstencil::render::Exporter;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut data_path: Option<PathBuf> = None;
    let mut blocks_path: Option<PathBuf> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data" | "-d" => match iter.next() {
                Some(v) => data_path = Some(PathBuf::from(v)),
                None => {
                    eprintln!("--data requires a file argument");
                    process::exit(1);
                }
            },
            "--blocks" | "-b" => match iter.next() {
                Some(v) => blocks_path = Some(PathBuf::from(v)),
                None => {
                    eprintln!("--blocks requires a file argument");
                    process::exit(1);
                }
            },
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no template file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("ops.json");
        o
    });

    let template_json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let template = match parse_template(&template_json) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error loading template: {e}");
            process::exit(1);
        }
    };

    let data: DataMap = match &data_path {
        Some(path) => match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Error reading data '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => DataMap::new(),
    };

    let blocks: BlockCatalog = match &blocks_path {
        Some(path) => match load_blocks(path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error reading blocks '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => BlockCatalog::new(),
    };

    let mut backend = RecordingRenderer::new();
    let exporter = Exporter::new(&blocks);
    if let Err(e) = exporter.export(&template, &data, &mut backend) {
        eprintln!("Error compiling template: {e}");
        process::exit(1);
    }

    let dump = match backend.to_json() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error serializing op stream: {e}");
            process::exit(1);
        }
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(&output, &dump) {
        eprintln!("Error writing '{}': {e}", output.display());
        process::exit(1);
    }
    eprintln!(
        "Wrote '{}' ({} drawing ops)",
        output.display(),
        backend.commands.len()
    );
}

/// Load a block catalog: a JSON array of block definitions, keyed by id.
fn load_blocks(path: &Path) -> Result<BlockCatalog, String> {
    let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let blocks: Vec<Block> = serde_json::from_str(&json).map_err(|e| e.to_string())?;
    let mut catalog = BlockCatalog::new();
    for block in blocks {
        block.validate().map_err(|e| e.to_string())?;
        catalog.insert(block.id.clone(), block);
    }
    Ok(catalog)
}

fn print_usage(prog: &str) {
    eprintln!("stencil – document template compiler (docstencil)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <template.json> [output.json] [--data data.json] [--blocks blocks.json]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <template.json>  Template document (legacy versions are migrated on load)");
    eprintln!("  [output.json]    Output path  (default: same stem as input with .ops.json)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --data, -d       JSON object mapping variable names to values");
    eprintln!("  --blocks, -b     JSON array of block definitions");
    eprintln!("  --help           Print this message");
}
