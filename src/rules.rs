use crate::context::{ReferenceKind, ValidationContext};
use crate::record::AttributeMap;
use crate::report::{ErrorKind, ReportKey, ValidationReport};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ID_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9.:^*$@!+_?-]+$").unwrap();
}

/// Nucleotide letters accepted in Sequence, Variant_seq and Codon values.
const NUCLEOTIDES: &str = "ACGTacgt";
/// The 20 standard amino-acid letters in both cases, plus the stop `*`.
const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWYacdefghiklmnpqrstvwy*";

/// The reserved attributes that carry a grammar beyond generic schema
/// conformance, with the report category each one writes under.
const RULED_ATTRIBUTES: [(&str, &str); 12] = [
    ("ID", "id"),
    ("Parent", "parent"),
    ("Alias", "alias"),
    ("Note", "note"),
    ("Target", "target"),
    ("Derives_from", "derives_from"),
    ("Gap", "gap"),
    ("Replacement", "replacement"),
    ("Sequence", "sequence"),
    ("Variant_seq", "variant_seq"),
    ("Amino_acid", "amino_acid"),
    ("Codon", "codon"),
];

/// Applies the per-attribute semantic rules of one line.
///
/// The `ID` rule runs first so that the feature's own ID is known to
/// the `Parent` and `Target` rules; the remaining ruled attributes are
/// processed in their order of appearance. Attributes without a rule
/// here are covered by the generic conformance layer in the validator.
pub(crate) fn apply_reserved_rules(
    line_number: usize,
    attrs: &AttributeMap<'_>,
    ctx: &mut ValidationContext,
    report: &mut ValidationReport,
) {
    let feature_id = check_id(line_number, attrs, ctx, report);
    let feature_id = feature_id.as_deref();

    for (name, value) in attrs.iter() {
        if name == "ID" {
            continue;
        }
        let Some(category) = category_of(name) else {
            continue;
        };
        let Some(text) = value.as_text() else {
            report.push(
                ReportKey::Line(line_number),
                category,
                ErrorKind::FormatViolation,
                format!("Attribute {} requires a value", name),
            );
            continue;
        };
        match name {
            "Parent" => check_parent(line_number, text, feature_id, ctx, report),
            "Alias" => check_alias(line_number, text, report),
            "Note" => check_note(line_number, text, report),
            "Target" => check_target(line_number, text, feature_id, ctx, report),
            "Derives_from" => check_derives_from(line_number, text, feature_id, ctx),
            "Gap" => check_gap(line_number, text, report),
            "Replacement" => check_replacement(line_number, text, report),
            "Sequence" => check_nucleotides(line_number, "Sequence", "sequence", text, report),
            "Variant_seq" => {
                check_nucleotides(line_number, "Variant_seq", "variant_seq", text, report)
            }
            "Amino_acid" => check_amino_acid(line_number, text, report),
            "Codon" => check_codon(line_number, text, report),
            _ => {}
        }
    }
}

fn category_of(name: &str) -> Option<&'static str> {
    RULED_ATTRIBUTES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

/// Character-set check first, then the duplicate check. The ID is
/// registered even when the character-set check failed, so later
/// references to it resolve instead of cascading.
fn check_id(
    line_number: usize,
    attrs: &AttributeMap<'_>,
    ctx: &mut ValidationContext,
    report: &mut ValidationReport,
) -> Option<String> {
    let value = attrs.get("ID")?;
    let Some(id) = value.as_text() else {
        report.push(
            ReportKey::Line(line_number),
            "id",
            ErrorKind::FormatViolation,
            "Attribute ID requires a value",
        );
        return None;
    };
    if !ID_PATTERN.is_match(id) {
        report.push(
            ReportKey::Line(line_number),
            "id",
            ErrorKind::FormatViolation,
            format!("Invalid characters in ID: {}", id),
        );
    }
    if !ctx.register(id) {
        report.push(
            ReportKey::Line(line_number),
            "id",
            ErrorKind::CrossReference,
            format!("Duplicate ID: {}", id),
        );
    }
    Some(id.to_string())
}

fn check_parent(
    line_number: usize,
    value: &str,
    feature_id: Option<&str>,
    ctx: &mut ValidationContext,
    report: &mut ValidationReport,
) {
    for parent_id in value.split(',') {
        // inserting parent -> child closes a cycle exactly when the
        // parent is already a descendant of this feature
        if let Some(child) = feature_id {
            if parent_id == child || ctx.is_reachable(child, parent_id) {
                report.push(
                    ReportKey::Line(line_number),
                    "parent",
                    ErrorKind::CrossReference,
                    format!("Circular reference detected for ID: {}", child),
                );
            }
        }
        if !ctx.has(parent_id) {
            ctx.defer_reference(ReferenceKind::Parent, parent_id, line_number, feature_id);
        }
        if let Some(child) = feature_id {
            ctx.record_parent_edge(parent_id, child);
        }
    }
}

fn check_alias(line_number: usize, value: &str, report: &mut ValidationReport) {
    for alias in value.split(',') {
        if !ID_PATTERN.is_match(alias) {
            report.push(
                ReportKey::Line(line_number),
                "alias",
                ErrorKind::FormatViolation,
                format!("Invalid characters in Alias: {}", alias),
            );
        }
    }
}

fn check_note(line_number: usize, value: &str, report: &mut ValidationReport) {
    for note in value.split(',') {
        if note.is_empty() {
            report.push(
                ReportKey::Line(line_number),
                "note",
                ErrorKind::FormatViolation,
                "Empty Note value",
            );
        }
    }
}

/// `Target` is whitespace-separated: target ID, start, end, and an
/// optional strand token which is carried but not checked here.
fn check_target(
    line_number: usize,
    value: &str,
    feature_id: Option<&str>,
    ctx: &mut ValidationContext,
    report: &mut ValidationReport,
) {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() < 3 {
        report.push(
            ReportKey::Line(line_number),
            "target",
            ErrorKind::FormatViolation,
            format!("Invalid Target attribute: {}", value),
        );
        return;
    }
    let (target_id, start, end) = (tokens[0], tokens[1], tokens[2]);
    if !ctx.has(target_id) {
        ctx.defer_reference(ReferenceKind::Target, target_id, line_number, feature_id);
    }
    match (start.parse::<i64>(), end.parse::<i64>()) {
        (Ok(s), Ok(e)) => {
            if s < 1 {
                report.push(
                    ReportKey::Line(line_number),
                    "target",
                    ErrorKind::FormatViolation,
                    format!("Target start position must be >= 1: {}", start),
                );
            }
            if e < s {
                report.push(
                    ReportKey::Line(line_number),
                    "target",
                    ErrorKind::FormatViolation,
                    format!("Target end position must be >= start position: {}", end),
                );
            }
        }
        _ => {
            report.push(
                ReportKey::Line(line_number),
                "target",
                ErrorKind::FormatViolation,
                "Invalid Target start or end position",
            );
        }
    }
}

fn check_derives_from(
    line_number: usize,
    value: &str,
    feature_id: Option<&str>,
    ctx: &mut ValidationContext,
) {
    for derived in value.split(',') {
        if !ctx.has(derived) {
            ctx.defer_reference(ReferenceKind::DerivesFrom, derived, line_number, feature_id);
        }
    }
}

fn check_gap(line_number: usize, value: &str, report: &mut ValidationReport) {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() < 2 {
        report.push(
            ReportKey::Line(line_number),
            "gap",
            ErrorKind::FormatViolation,
            format!("Invalid Gap attribute: {}", value),
        );
        return;
    }
    match tokens[0].parse::<i64>() {
        Ok(len) if len >= 0 => {}
        _ => {
            report.push(
                ReportKey::Line(line_number),
                "gap",
                ErrorKind::FormatViolation,
                format!("Invalid Gap length: {}", tokens[0]),
            );
        }
    }
}

fn check_replacement(line_number: usize, value: &str, report: &mut ValidationReport) {
    if value.chars().count() != 1 {
        report.push(
            ReportKey::Line(line_number),
            "replacement",
            ErrorKind::FormatViolation,
            format!("Invalid Replacement value: {}", value),
        );
    }
}

fn check_nucleotides(
    line_number: usize,
    name: &str,
    category: &str,
    value: &str,
    report: &mut ValidationReport,
) {
    if !value.chars().all(|c| NUCLEOTIDES.contains(c)) {
        report.push(
            ReportKey::Line(line_number),
            category,
            ErrorKind::FormatViolation,
            format!("Invalid characters in {}: {}", name, value),
        );
    }
}

fn check_amino_acid(line_number: usize, value: &str, report: &mut ValidationReport) {
    if !value.chars().all(|c| AMINO_ACIDS.contains(c)) {
        report.push(
            ReportKey::Line(line_number),
            "amino_acid",
            ErrorKind::FormatViolation,
            format!("Invalid characters in Amino_acid: {}", value),
        );
    }
}

fn check_codon(line_number: usize, value: &str, report: &mut ValidationReport) {
    if value.chars().count() != 3 || !value.chars().all(|c| NUCLEOTIDES.contains(c)) {
        report.push(
            ReportKey::Line(line_number),
            "codon",
            ErrorKind::FormatViolation,
            format!("Invalid Codon value: {}", value),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(raw: &str, ctx: &mut ValidationContext) -> ValidationReport {
        let mut report = ValidationReport::new();
        let attrs = AttributeMap::parse(raw);
        apply_reserved_rules(1, &attrs, ctx, &mut report);
        report
    }

    #[test]
    fn test_duplicate_id_flagged_on_second_occurrence() {
        let mut ctx = ValidationContext::new();
        let first = run("ID=gene1", &mut ctx);
        assert!(first.is_empty());
        let second = run("ID=gene1", &mut ctx);
        let findings = second.line(1).unwrap().get("id").unwrap();
        assert_eq!(findings[0].message, "Duplicate ID: gene1");
        assert_eq!(findings[0].kind, ErrorKind::CrossReference);
    }

    #[test]
    fn test_invalid_id_still_registers() {
        let mut ctx = ValidationContext::new();
        let report = run("ID=bad id", &mut ctx);
        assert!(report
            .line(1)
            .unwrap()
            .get("id")
            .unwrap()[0]
            .message
            .starts_with("Invalid characters in ID"));
        assert!(ctx.has("bad id"));
    }

    #[test]
    fn test_reserved_flag_requires_value() {
        let mut ctx = ValidationContext::new();
        let report = run("Parent", &mut ctx);
        let findings = report.line(1).unwrap().get("parent").unwrap();
        assert_eq!(findings[0].message, "Attribute Parent requires a value");
    }

    #[test]
    fn test_alias_and_note_lists() {
        let mut ctx = ValidationContext::new();
        let report = run("Alias=ok.1,bad alias;Note=fine,", &mut ctx);
        let set = report.line(1).unwrap();
        assert_eq!(
            set.get("alias").unwrap()[0].message,
            "Invalid characters in Alias: bad alias"
        );
        assert_eq!(set.get("note").unwrap()[0].message, "Empty Note value");
    }

    #[test]
    fn test_target_arity_and_range() {
        let mut ctx = ValidationContext::new();
        ctx.register("est5");
        let report = run("ID=m1;Target=est5 0 10", &mut ctx);
        let findings = report.line(1).unwrap().get("target").unwrap();
        assert_eq!(
            findings[0].message,
            "Target start position must be >= 1: 0"
        );

        let report = run("Target=est5", &mut ctx);
        let findings = report.line(1).unwrap().get("target").unwrap();
        assert_eq!(findings[0].message, "Invalid Target attribute: est5");

        let report = run("Target=est5 ten 20", &mut ctx);
        let findings = report.line(1).unwrap().get("target").unwrap();
        assert_eq!(findings[0].message, "Invalid Target start or end position");
    }

    #[test]
    fn test_gap_replacement_codon() {
        let mut ctx = ValidationContext::new();
        let report = run("Gap=-4 M3;Replacement=AC;Codon=AXG", &mut ctx);
        let set = report.line(1).unwrap();
        assert_eq!(set.get("gap").unwrap()[0].message, "Invalid Gap length: -4");
        assert_eq!(
            set.get("replacement").unwrap()[0].message,
            "Invalid Replacement value: AC"
        );
        assert_eq!(
            set.get("codon").unwrap()[0].message,
            "Invalid Codon value: AXG"
        );
    }

    #[test]
    fn test_sequence_alphabets() {
        let mut ctx = ValidationContext::new();
        let clean = run("Sequence=acgtACGT;Amino_acid=MKV*;Codon=atg", &mut ctx);
        assert!(clean.is_empty());
        let dirty = run("Sequence=ACGTXYZ;Amino_acid=MKB", &mut ctx);
        let set = dirty.line(1).unwrap();
        assert_eq!(
            set.get("sequence").unwrap()[0].message,
            "Invalid characters in Sequence: ACGTXYZ"
        );
        assert_eq!(
            set.get("amino_acid").unwrap()[0].message,
            "Invalid characters in Amino_acid: MKB"
        );
    }
}
