use crate::{read_schema, report_and_exit, SchemaArgs};

use flatproto::parser::parse_document;
use flatproto::report::Reporter;

use anyhow::Result;

pub fn dump_ast(args: &SchemaArgs) -> Result<()> {
    let (label, src) = read_schema(&args.schema)?;
    match parse_document(&src) {
        Ok(document) => {
            println!("{document:#?}");
            Ok(())
        }
        Err(err) => {
            let mut reporter = Reporter::new();
            reporter.error(err.token, err.message);
            report_and_exit(reporter.into_diagnostics(), &label, &src)
        }
    }
}
