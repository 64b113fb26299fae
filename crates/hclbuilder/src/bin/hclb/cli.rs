//! hclb cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; hclb ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a document in canonical formatting
    Render(RenderCommand),

    /// Set an attribute (`type.label1…labelN.attribute`)
    Set(SetCommand),

    /// Replace a block (`type.label1…labelN`) with the given attributes
    SetBlock(SetBlockCommand),

    /// Remove an attribute, or a block with --block
    Remove(RemoveCommand),

    /// Add a (dotted) attribute to a block, merging with existing objects
    Add(AddCommand),

    /// Combine several documents into one
    Compose(ComposeCommand),

    /// Evaluate hcl expression
    #[command(alias = "eval")]
    Evaluate(EvaluateCommand),
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a file
    ///
    /// Reads HCL from stdin if not provided.
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,

    /// Write the result back to the input file instead of printing it
    #[clap(short = 'i', long = "in-place", requires("file"))]
    pub in_place: bool,
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    #[clap(flatten)]
    pub input: InputArgs,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Attribute path, e.g. `variable.region.default`
    pub path: String,

    /// HCL expression. Anything that is not a valid expression is used as a string.
    pub value: String,
}

#[derive(Parser, Debug)]
pub struct SetBlockCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Block path, e.g. `resource.widget.default`
    pub path: String,

    /// Attributes as `key=<hcl expression>`
    #[arg(value_parser = parse_key_value)]
    pub attributes: Vec<(String, String)>,
}

#[derive(Parser, Debug)]
pub struct RemoveCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Treat the path as a block path
    #[clap(short = 'b', long = "block")]
    pub block: bool,

    pub path: String,
}

#[derive(Parser, Debug)]
pub struct AddCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Block to add to (`type.label1…labelN`). Defaults to the first block.
    #[clap(short = 'b', long = "block")]
    pub block: Option<String>,

    /// Attribute key, nested keys separated by `.`
    pub key: String,

    /// HCL expression. Anything that is not a valid expression is used as a string.
    pub value: String,
}

#[derive(Parser, Debug)]
pub struct ComposeCommand {
    /// Files to combine, in order
    #[clap(required(true))]
    pub files: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct EvaluateCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// HCL expression to evaluate
    pub expression: String,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("expected `key=value`, got `{s}`")),
    }
}
