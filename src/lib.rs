#![forbid(unsafe_code)]
//! Schema compiler for a flat, append-friendly zero-copy wire format.
//!
//! A schema declares enumerations, fixed-size structs, variable-size
//! tables, unions and lists. The pipeline is lexer → parser → annotator:
//! the annotator resolves names, assigns wire offsets and presence bits,
//! computes default byte images and validates every rule, producing the
//! read-only [`ir::Schema`] that code emitters consume. The [`wire`]
//! module is the runtime the generated readers and writers call into.

pub mod annotate;
pub mod ast;
pub mod ir;
pub mod keywords;
pub mod layout;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod wire;


pub use report::Diagnostics;

/// Run the whole pipeline over a schema source. On failure every
/// collected diagnostic is returned, positionally anchored in `src`.
pub fn compile(src: &str) -> Result<ir::Schema, Diagnostics> {
    let document = parser::parse_document(src).map_err(|err| {
        let mut reporter = report::Reporter::new();
        reporter.error(err.token, err.message);
        reporter.into_diagnostics()
    })?;
    annotate::annotate(src, &document)
}
