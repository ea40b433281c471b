use crate::{read_schema, report_and_exit, SchemaArgs};

use anyhow::Result;

pub fn dump_ir(args: &SchemaArgs) -> Result<()> {
    let (label, src) = read_schema(&args.schema)?;
    match flatproto::compile(&src) {
        Ok(schema) => {
            println!("{schema:#?}");
            Ok(())
        }
        Err(diags) => report_and_exit(diags, &label, &src),
    }
}
