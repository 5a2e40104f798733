use lazy_static::lazy_static;
use nutype::nutype;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

// we give each validation run a unique program identifier
// which is the order in which it was started.
lazy_static! {
    static ref RUN_COUNTER: AtomicU32 = AtomicU32::new(0);
}

#[nutype(derive(Debug, Clone, AsRef))]
/// The identifier of a validation run.
pub struct ValidationRunId(u32);

fn next_run_id() -> ValidationRunId {
    ValidationRunId::new(RUN_COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The kind of a validation finding.
///
/// Every finding produced during a run is non-fatal and purely reported;
/// the kind classifies what went wrong so that callers can filter or
/// weight findings without parsing message text.
///
/// # Variants
///
/// * `Structural` - a line did not have the expected tab-separated shape.
/// * `TypeConformance` - a field or attribute value failed the schema check
///   for its logical type.
/// * `FormatViolation` - a character-set, arity, or range rule of a
///   positional field or reserved attribute was violated.
/// * `CrossReference` - a duplicate ID, an unresolved Parent/Target/
///   Derives_from reference, or a circular parent relationship.
/// * `VocabularyCoverage` - a permissible feature type was never observed
///   in the file.
pub enum ErrorKind {
    Structural,
    TypeConformance,
    FormatViolation,
    CrossReference,
    VocabularyCoverage,
}

#[derive(Debug, Clone)]
/// One validation finding: a classification and a human-readable message.
pub struct Finding {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Addresses one entry of a [ValidationReport].
///
/// Most findings are keyed by the 1-based physical line number they were
/// observed on. Findings produced by the end-of-file reconciliation of
/// unresolved `Parent` references are keyed by the referencing feature's
/// ID, and file-wide findings use the [ReportKey::File] pseudo-key.
pub enum ReportKey {
    Line(usize),
    Feature(String),
    File,
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKey::Line(n) => write!(f, "line {}", n),
            ReportKey::Feature(id) => write!(f, "feature {}", id),
            ReportKey::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Default)]
/// The findings recorded under one [ReportKey], grouped by category.
///
/// Categories are short field or rule names such as `seqid`, `start`,
/// `parent`, or `attribute.Dbxref`. Both the categories and the findings
/// within a category keep their insertion order.
pub struct FindingSet {
    categories: Vec<(String, Vec<Finding>)>,
}

impl FindingSet {
    fn push(&mut self, category: &str, finding: Finding) {
        match self
            .categories
            .iter_mut()
            .find(|(c, _)| c.as_str() == category)
        {
            Some((_, findings)) => findings.push(finding),
            None => self.categories.push((category.to_string(), vec![finding])),
        }
    }

    /// Returns the findings recorded under `category`, if any.
    pub fn get(&self, category: &str) -> Option<&[Finding]> {
        self.categories
            .iter()
            .find(|(c, _)| c.as_str() == category)
            .map(|(_, f)| f.as_slice())
    }

    /// Iterates over `(category, findings)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Finding])> + '_ {
        self.categories
            .iter()
            .map(|(c, f)| (c.as_str(), f.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The total number of findings across all categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, f)| f.len()).sum()
    }
}

#[derive(Debug)]
/// The accumulated outcome of validating one input.
///
/// A report is an append-only multimap from [ReportKey] to
/// [FindingSet], preserving the order in which keys first received a
/// finding. The absence of a key means nothing was found there; an
/// empty report means the input is valid with respect to the schema it
/// was validated against.
///
/// This structure is the sole contract with any presentation layer. A
/// [fmt::Display] implementation renders it as indented plain text, one
/// finding per line.
pub struct ValidationReport {
    run_id: ValidationRunId,
    entries: Vec<(ReportKey, FindingSet)>,
}

impl ValidationReport {
    pub fn new() -> ValidationReport {
        ValidationReport {
            run_id: next_run_id(),
            entries: Vec::new(),
        }
    }

    /// The process-unique identifier of the run that produced this report.
    pub fn run_id(&self) -> &ValidationRunId {
        &self.run_id
    }

    /// Appends a finding under `key` and `category`.
    pub fn push(&mut self, key: ReportKey, category: &str, kind: ErrorKind, message: impl Into<String>) {
        self.entry_mut(key).push(
            category,
            Finding {
                kind,
                message: message.into(),
            },
        );
    }

    fn entry_mut(&mut self, key: ReportKey) -> &mut FindingSet {
        let idx = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key, FindingSet::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Returns the findings recorded under `key`, if any.
    pub fn get(&self, key: &ReportKey) -> Option<&FindingSet> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Shorthand for looking up the findings of one line.
    pub fn line(&self, line_number: usize) -> Option<&FindingSet> {
        self.get(&ReportKey::Line(line_number))
    }

    /// Iterates over `(key, findings)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ReportKey, &FindingSet)> + '_ {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The total number of findings in the report.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, s)| s.len()).sum()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        ValidationReport::new()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, set) in self.iter() {
            writeln!(f, "{}:", key)?;
            for (category, findings) in set.iter() {
                for finding in findings {
                    writeln!(f, "  {}: {}", category, finding.message)?;
                }
            }
        }
        Ok(())
    }
}
