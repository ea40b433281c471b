use crate::{read_schema, SchemaArgs};

use flatproto::lexer::Lexer;

use anyhow::Result;

pub fn dump_tokens(args: &SchemaArgs) -> Result<()> {
    let (_, src) = read_schema(&args.schema)?;
    for token in Lexer::new(&src) {
        println!(
            "{:>6} {:<12} {:?}",
            token.index,
            format!("{:?}", token.kind),
            token.text(&src)
        );
    }
    Ok(())
}
