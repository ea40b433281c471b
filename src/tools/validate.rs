use crate::{read_schema, report_and_exit, SchemaArgs};

use anyhow::Result;

pub fn validate(args: &SchemaArgs) -> Result<()> {
    let (label, src) = read_schema(&args.schema)?;
    match flatproto::compile(&src) {
        Ok(_) => Ok(()),
        Err(diags) => report_and_exit(diags, &label, &src),
    }
}
