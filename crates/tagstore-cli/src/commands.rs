use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::BufReader;

use anyhow::{bail, Context};
use colored::Colorize;
use tagstore_store::{RecordFiles, StoreConfig};
use tagstore_tree::{Compound, Tag};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Dump(args) => cmd_dump(args, cli.format),
        Command::Keys(args) => cmd_keys(args, cli.format),
        Command::Rm(args) => cmd_rm(args),
    }
}

fn cmd_dump(args: DumpArgs, format: OutputFormat) -> anyhow::Result<()> {
    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let root = tagstore_tree::read_from(&mut BufReader::new(file))
        .with_context(|| format!("{} is not a valid record file", args.file.display()))?;
    debug!(file = %args.file.display(), entries = root.len(), "record file decoded");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&root)?),
        OutputFormat::Text => {
            println!("{} ({} entries)", args.file.display().to_string().bold(), root.len());
            print!("{}", render_text(&root));
        }
    }
    Ok(())
}

fn cmd_keys(args: KeysArgs, format: OutputFormat) -> anyhow::Result<()> {
    let files = RecordFiles::new(&resolve_config(&args.location)?);
    let keys = files.list_keys(&args.type_name)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&keys)?),
        OutputFormat::Text if keys.is_empty() => {
            println!("No stored records of type {}.", args.type_name.yellow());
        }
        OutputFormat::Text => {
            for key in &keys {
                println!("{key}");
            }
        }
    }
    Ok(())
}

fn cmd_rm(args: RmArgs) -> anyhow::Result<()> {
    let files = RecordFiles::new(&resolve_config(&args.location)?);
    let path = files.paths().record_path(&args.type_name, &args.key)?;
    debug!(path = %path.display(), "removing record file");
    let removed = files
        .remove(&path)
        .with_context(|| format!("cannot remove {}", path.display()))?;
    if removed {
        println!("{} Removed {}/{}", "✓".green().bold(), args.type_name, args.key.yellow());
    } else {
        println!("No stored record {}/{}.", args.type_name, args.key.yellow());
    }
    Ok(())
}

pub(crate) fn resolve_config(location: &StoreLocation) -> anyhow::Result<StoreConfig> {
    match (&location.config, &location.base) {
        (Some(path), _) => {
            debug!(config = %path.display(), "loading store config");
            StoreConfig::load(path)
                .with_context(|| format!("cannot load config {}", path.display()))
        }
        (None, Some(base)) => Ok(StoreConfig::new(base.clone())),
        (None, None) => bail!("either --base or --config is required"),
    }
}

/// Indented plain-text rendering of a tree, one entry per line.
pub(crate) fn render_text(root: &Compound) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_compound(&mut out, root, 0);
    out
}

fn render_compound(out: &mut String, compound: &Compound, depth: usize) -> fmt::Result {
    for (name, tag) in compound.iter() {
        render_tag(out, name, tag, depth)?;
    }
    Ok(())
}

fn render_tag(out: &mut String, name: &str, tag: &Tag, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match tag {
        Tag::Byte(v) => writeln!(out, "{indent}{name}: byte {v}"),
        Tag::Int(v) => writeln!(out, "{indent}{name}: int {v}"),
        Tag::Float(v) => writeln!(out, "{indent}{name}: float {v}"),
        Tag::Double(v) => writeln!(out, "{indent}{name}: double {v}"),
        Tag::String(v) => writeln!(out, "{indent}{name}: string {v:?}"),
        Tag::List(list) => {
            let element = list
                .element_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "end".into());
            writeln!(out, "{indent}{name}: list<{element}> [{}]", list.len())?;
            for item in list.iter() {
                render_tag(out, &item.name, &item.tag, depth + 1)?;
            }
            Ok(())
        }
        Tag::Compound(child) => {
            writeln!(out, "{indent}{name}: compound {{{}}}", child.len())?;
            render_compound(out, child, depth + 1)
        }
    }
}
