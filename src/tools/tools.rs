mod dump_ast;
use dump_ast::dump_ast;
mod dump_ir;
use dump_ir::dump_ir;
mod dump_tokens;
use dump_tokens::dump_tokens;
mod validate;
use validate::validate;

use flatproto::Diagnostics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Compile and inspect wire format schemas
#[derive(Clone, Debug, Parser)]
struct Args {
    // operation to execute
    #[command(subcommand)]
    operation: Operation,
}

#[derive(Clone, Debug, Subcommand)]
enum Operation {
    /// Check a schema, printing every error with its source location
    Validate(SchemaArgs),
    /// Print the token stream of a schema
    DumpTokens(SchemaArgs),
    /// Print the parse tree of a schema
    DumpAst(SchemaArgs),
    /// Annotate a schema and print the representation emitters consume
    DumpIr(SchemaArgs),
}

#[derive(Clone, Debug, Parser)]
struct SchemaArgs {
    /// schema file to read
    schema: PathBuf,
}

fn read_schema(path: &Path) -> Result<(String, String)> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read {}", path.display()))?;
    Ok((path.display().to_string(), src))
}

/// Print the diagnostics the way every subcommand reports them and exit
/// with a failure code. Nothing is ever emitted after an error.
fn report_and_exit(diags: Diagnostics, label: &str, src: &str) -> ! {
    let mut stderr = std::io::stderr().lock();
    // stderr is best effort
    let _ = diags.render(label, src, &mut stderr);
    std::process::exit(1);
}

fn main() -> Result<()> {
    let args = Args::parse();

    match &args.operation {
        Operation::Validate(schema_args) => validate(schema_args),
        Operation::DumpTokens(schema_args) => dump_tokens(schema_args),
        Operation::DumpAst(schema_args) => dump_ast(schema_args),
        Operation::DumpIr(schema_args) => dump_ir(schema_args),
    }
}
