//! gffcheck is a structural and semantic validator for
//! [GFF3](https://github.com/The-Sequence-Ontology/Specifications/blob/master/gff3.md)
//! genome annotation files for use in [Rust](https://www.rust-lang.org/).
//! It checks the tab-separated shape of every line, the conformance of each
//! positional field, the grammar of the reserved attributes, and the
//! file-wide cross-reference integrity of feature IDs (duplicates,
//! unresolved or circular `Parent` relationships, unresolved `Target` and
//! `Derives_from` references), accumulating everything it finds into a
//! single report instead of stopping at the first problem. While we
//! believe gffcheck can be useful and helpful today, we are open to
//! feedback, suggestions and ideas for improvement. If you'd like to
//! suggest some, please do so over on the
//! [GitHub page](https://github.com/COMBINE-lab/gffcheck).
//!
//! ```rust
//! use gffcheck::{GffSchema, Gff3Validator};
//!
//! let validator = Gff3Validator::new(GffSchema::with_feature_types(["gene", "mRNA"]));
//! let gff = "chr1\thavana\tgene\t11869\t14409\t.\t+\t.\tID=gene1\n\
//! chr1\thavana\tmRNA\t11869\t14409\t.\t+\t.\tID=mrna1;Parent=gene1\n";
//! let report = validator.validate_reader(gff.as_bytes()).unwrap();
//! assert!(report.is_empty());
//! ```

pub mod context;
pub mod reader;
pub mod record;
pub mod report;
mod rules;
pub mod schema;
pub mod validator;

pub use report::{ErrorKind, Finding, ReportKey, ValidationReport};
pub use schema::{GffSchema, SchemaProvider};
pub use validator::Gff3Validator;
