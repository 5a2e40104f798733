use crate::context::{ReferenceKind, ValidationContext};
use crate::reader;
use crate::record::{self, AttrValue, AttributeMap, FeatureRecord, ParsedLine};
use crate::report::{ErrorKind, ReportKey, ValidationReport};
use crate::rules;
use crate::schema::SchemaProvider;
use anyhow::Context;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

pub(crate) const VALID_STRANDS: [&str; 3] = ["+", "-", "."];

/// A GFF3 validator parameterized over a [SchemaProvider].
///
/// The validator itself holds only the schema; all per-run state lives
/// in a [ValidationContext] created fresh for every input, so one
/// validator value can check any number of files in sequence (or, with
/// caller-managed contexts, have single lines driven through
/// [Gff3Validator::validate_line]).
///
/// Validation never stops at the first problem. Structural, field,
/// attribute and cross-reference findings accumulate in a
/// [ValidationReport]; only an I/O failure aborts a run.
///
/// # Examples
///
/// ```rust
/// use gffcheck::{GffSchema, Gff3Validator};
///
/// let validator = Gff3Validator::new(GffSchema::with_feature_types(["gene"]));
/// let gff = "##gff-version 3\nchr1\ttest\tgene\t1\t100\t.\t+\t.\tID=gene1\n";
/// let report = validator.validate_reader(gff.as_bytes()).unwrap();
/// assert!(report.is_empty());
/// ```
pub struct Gff3Validator<S> {
    schema: S,
}

impl<S: SchemaProvider> Gff3Validator<S> {
    pub fn new(schema: S) -> Gff3Validator<S> {
        Gff3Validator { schema }
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Validates the (plain or gzipped) GFF3 file at `file_path`.
    ///
    /// Returns the report of everything found; an [anyhow::Error] is
    /// produced only when the file cannot be opened or read.
    pub fn validate_file<P: AsRef<Path>>(&self, file_path: P) -> anyhow::Result<ValidationReport> {
        let rdr = reader::open_gff3(file_path.as_ref())?;
        self.validate_reader(rdr)
    }

    /// Validates GFF3 lines from any buffered reader.
    ///
    /// Lines beginning with `#` are skipped entirely. Report keys use
    /// 1-based physical line numbers over the whole input, comments
    /// included.
    pub fn validate_reader<R: BufRead>(&self, rdr: R) -> anyhow::Result<ValidationReport> {
        let mut ctx = ValidationContext::new();
        let mut report = ValidationReport::new();
        let mut n_comments = 0usize;
        let mut n_records = 0usize;

        for (idx, l) in rdr.lines().enumerate() {
            let line = l.context("failed reading a line from the input")?;
            match record::parse_line(&line) {
                ParsedLine::Comment => {
                    n_comments += 1;
                }
                ParsedLine::Malformed { fields } => {
                    report.push(
                        ReportKey::Line(idx + 1),
                        "error",
                        ErrorKind::Structural,
                        format!("Line must have 9 tab-separated fields, found {}", fields),
                    );
                }
                ParsedLine::Record(rec) => {
                    n_records += 1;
                    self.validate_record(idx + 1, &rec, &mut ctx, &mut report);
                }
            }
        }

        self.finalize(&ctx, &mut report);
        info!(
            "Finished validating the input. Found {} comments and {} records.",
            n_comments, n_records
        );
        Ok(report)
    }

    /// Validates a single raw line against shared run state.
    ///
    /// Comments produce nothing; a malformed line produces exactly one
    /// structural finding and no field-level checks. Callers driving
    /// lines by hand must invoke [Gff3Validator::finalize] once after
    /// the last line to run the end-of-file pass.
    pub fn validate_line(
        &self,
        line_number: usize,
        line: &str,
        ctx: &mut ValidationContext,
        report: &mut ValidationReport,
    ) {
        match record::parse_line(line) {
            ParsedLine::Comment => {}
            ParsedLine::Malformed { fields } => {
                report.push(
                    ReportKey::Line(line_number),
                    "error",
                    ErrorKind::Structural,
                    format!("Line must have 9 tab-separated fields, found {}", fields),
                );
            }
            ParsedLine::Record(rec) => {
                self.validate_record(line_number, &rec, ctx, report);
            }
        }
    }

    /// All field rules run even when earlier ones fail; findings are
    /// cumulative per line, keyed by field name.
    fn validate_record(
        &self,
        line_number: usize,
        rec: &FeatureRecord<'_>,
        ctx: &mut ValidationContext,
        report: &mut ValidationReport,
    ) {
        let key = ReportKey::Line(line_number);

        self.check_typed_field(line_number, "Seqid", "seqid", rec.seqid, report);
        self.check_typed_field(line_number, "Source", "source", rec.source, report);

        if self.schema.has_type("Type") && self.schema.conforms("Type", rec.feature_type) {
            ctx.record_feature_type(rec.feature_type);
        } else {
            report.push(
                key.clone(),
                "type",
                ErrorKind::TypeConformance,
                format!("Invalid type: {}", rec.feature_type),
            );
        }

        match (rec.start.parse::<i64>(), rec.end.parse::<i64>()) {
            (Ok(start), Ok(end)) => {
                if start < 1 {
                    report.push(
                        key.clone(),
                        "start",
                        ErrorKind::FormatViolation,
                        format!("Start position must be >= 1: {}", rec.start),
                    );
                }
                if end < start {
                    report.push(
                        key.clone(),
                        "end",
                        ErrorKind::FormatViolation,
                        format!("End position must be >= start position: {}", rec.end),
                    );
                }
            }
            // a failure on either side is reported for both fields
            _ => {
                report.push(
                    key.clone(),
                    "start",
                    ErrorKind::FormatViolation,
                    format!("Invalid start position: {}", rec.start),
                );
                report.push(
                    key.clone(),
                    "end",
                    ErrorKind::FormatViolation,
                    format!("Invalid end position: {}", rec.end),
                );
            }
        }

        // `.` means unscored
        if rec.score != "."
            && !(self.schema.has_type("score") && self.schema.conforms("score", rec.score))
        {
            report.push(
                key.clone(),
                "score",
                ErrorKind::TypeConformance,
                format!("Invalid score: {}", rec.score),
            );
        }

        if !VALID_STRANDS.contains(&rec.strand) {
            report.push(
                key.clone(),
                "strand",
                ErrorKind::FormatViolation,
                format!("Invalid strand: {}", rec.strand),
            );
        }

        if rec.phase != "."
            && !(self.schema.has_type("phase") && self.schema.conforms("phase", rec.phase))
        {
            report.push(
                key.clone(),
                "phase",
                ErrorKind::TypeConformance,
                format!("Invalid phase: {}", rec.phase),
            );
        }

        let attrs = AttributeMap::parse(rec.raw_attributes);
        self.check_attribute_conformance(line_number, &attrs, report);
        rules::apply_reserved_rules(line_number, &attrs, ctx, report);
    }

    fn check_typed_field(
        &self,
        line_number: usize,
        type_name: &str,
        category: &str,
        value: &str,
        report: &mut ValidationReport,
    ) {
        if !(self.schema.has_type(type_name) && self.schema.conforms(type_name, value)) {
            report.push(
                ReportKey::Line(line_number),
                category,
                ErrorKind::TypeConformance,
                format!("Invalid {}: {}", category, value),
            );
        }
    }

    /// The generic conformance layer: every attribute key is checked
    /// against the schema under its own name, reserved or not.
    fn check_attribute_conformance(
        &self,
        line_number: usize,
        attrs: &AttributeMap<'_>,
        report: &mut ValidationReport,
    ) {
        for (name, value) in attrs.iter() {
            let category = format!("attribute.{}", name);
            match value {
                AttrValue::Text(v) => {
                    if !(self.schema.has_type(name) && self.schema.conforms(name, v)) {
                        report.push(
                            ReportKey::Line(line_number),
                            &category,
                            ErrorKind::TypeConformance,
                            format!("Invalid attribute: {}={}", name, v),
                        );
                    }
                }
                AttrValue::Flag => {
                    if !self.schema.has_type(name) {
                        report.push(
                            ReportKey::Line(line_number),
                            &category,
                            ErrorKind::TypeConformance,
                            format!("Invalid attribute: {}", name),
                        );
                    }
                }
            }
        }
    }

    /// The end-of-file pass: reconciles deferred references and checks
    /// vocabulary coverage. [Gff3Validator::validate_reader] calls this
    /// itself; it is public for callers that drive
    /// [Gff3Validator::validate_line] by hand.
    pub fn finalize(&self, ctx: &ValidationContext, report: &mut ValidationReport) {
        for pending in ctx.unresolved_references() {
            match pending.kind {
                // an unresolved parent is reported at the file scope,
                // keyed by the referencing child's ID when it has one
                ReferenceKind::Parent => {
                    let key = match &pending.feature_id {
                        Some(id) => ReportKey::Feature(id.clone()),
                        None => ReportKey::Line(pending.line_number),
                    };
                    report.push(
                        key,
                        "parent",
                        ErrorKind::CrossReference,
                        format!("Parent ID not found: {}", pending.referent),
                    );
                }
                ReferenceKind::Target => {
                    report.push(
                        ReportKey::Line(pending.line_number),
                        "target",
                        ErrorKind::CrossReference,
                        format!("Target ID not found: {}", pending.referent),
                    );
                }
                ReferenceKind::DerivesFrom => {
                    report.push(
                        ReportKey::Line(pending.line_number),
                        "derives_from",
                        ErrorKind::CrossReference,
                        format!("Derives_from ID not found: {}", pending.referent),
                    );
                }
            }
        }

        let missing: Vec<&str> = self
            .schema
            .permissible_values("Type")
            .iter()
            .filter(|t| !ctx.feature_types().contains(t.as_str()))
            .map(|t| t.as_str())
            .collect();
        if !missing.is_empty() {
            report.push(
                ReportKey::File,
                "feature_type",
                ErrorKind::VocabularyCoverage,
                format!("Missing feature types: {}", missing.join(", ")),
            );
        }
    }
}
