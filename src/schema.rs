use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEQID_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9.:^*$@!+_?|-]+$").unwrap();
}

/// The attribute names reserved by the GFF3 specification, plus the
/// sequence-alteration attributes carried over from the classic
/// validator tool chain. Reserved names start with an uppercase letter;
/// lowercase names are left to applications.
pub static RESERVED_ATTRIBUTES: [&str; 16] = [
    "ID",
    "Name",
    "Alias",
    "Parent",
    "Target",
    "Gap",
    "Derives_from",
    "Note",
    "Dbxref",
    "Ontology_term",
    "Is_circular",
    "Replacement",
    "Sequence",
    "Variant_seq",
    "Amino_acid",
    "Codon",
];

/// The type-checking capability the validator is parameterized over.
///
/// The validator never interprets field or attribute values on its own
/// beyond structural rules; whether a raw string conforms to a named
/// logical type ("Seqid", "Source", "Type", "score", "phase", or an
/// attribute name) is decided by the provider. [GffSchema] is the
/// built-in provider; callers with their own schema representation
/// implement this trait instead.
pub trait SchemaProvider {
    /// Whether `name` is a known logical type or attribute slot.
    fn has_type(&self, name: &str) -> bool;

    /// Whether `value` conforms to the type named `name`. Only
    /// meaningful when [SchemaProvider::has_type] holds for `name`.
    fn conforms(&self, name: &str, value: &str) -> bool;

    /// The ordered controlled vocabulary of the type named `name`.
    /// Currently consulted only for `"Type"`; providers without a
    /// vocabulary for `name` return an empty slice.
    fn permissible_values(&self, name: &str) -> &[String];
}

/// A compact default vocabulary of permissible feature types, drawn
/// from the Sequence Ontology terms that annotation pipelines emit most.
pub static DEFAULT_FEATURE_TYPES: [&str; 12] = [
    "gene",
    "mRNA",
    "exon",
    "CDS",
    "five_prime_UTR",
    "three_prime_UTR",
    "ncRNA",
    "rRNA",
    "tRNA",
    "transcript",
    "pseudogene",
    "region",
];

#[derive(Debug, Clone)]
/// The built-in [SchemaProvider].
///
/// Field rules follow the GFF3 specification: seqids are restricted to
/// the unescaped seqid character set, sources must be printable and
/// non-empty, scores are floating point, and phases are one of `0`,
/// `1`, `2`. A `type` value conforms when it is a member of the
/// configured vocabulary or a `SO:` accession. Attribute slots are
/// known when they are reserved GFF3 names or start with a lowercase
/// letter (the application-specific namespace); unknown uppercase
/// names do not conform.
///
/// # Examples
///
/// ```rust
/// use gffcheck::schema::{GffSchema, SchemaProvider};
///
/// let schema = GffSchema::with_feature_types(["gene", "mRNA"]);
/// assert!(schema.conforms("Type", "gene"));
/// assert!(!schema.conforms("Type", "operon"));
/// assert_eq!(schema.permissible_values("Type").len(), 2);
/// ```
pub struct GffSchema {
    feature_types: Vec<String>,
}

impl GffSchema {
    /// A schema carrying the [DEFAULT_FEATURE_TYPES] vocabulary.
    pub fn new() -> GffSchema {
        GffSchema::with_feature_types(DEFAULT_FEATURE_TYPES)
    }

    /// A schema whose `Type` vocabulary is exactly `feature_types`, in
    /// the given order.
    pub fn with_feature_types<I, S>(feature_types: I) -> GffSchema
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        GffSchema {
            feature_types: feature_types.into_iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for GffSchema {
    fn default() -> Self {
        GffSchema::new()
    }
}

impl SchemaProvider for GffSchema {
    fn has_type(&self, name: &str) -> bool {
        matches!(name, "Seqid" | "Source" | "Type")
            || RESERVED_ATTRIBUTES.contains(&name)
            || name
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_lowercase())
    }

    fn conforms(&self, name: &str, value: &str) -> bool {
        match name {
            "Seqid" => SEQID_PATTERN.is_match(value),
            "Source" => !value.is_empty() && !value.chars().any(|c| c.is_control()),
            "Type" => value.starts_with("SO:") || self.feature_types.iter().any(|t| t == value),
            "score" => value.parse::<f64>().is_ok(),
            "phase" => matches!(value, "0" | "1" | "2"),
            _ => true,
        }
    }

    fn permissible_values(&self, name: &str) -> &[String] {
        match name {
            "Type" => &self.feature_types,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seqid_charset() {
        let schema = GffSchema::new();
        assert!(schema.conforms("Seqid", "chr1"));
        assert!(schema.conforms("Seqid", "ctg123.4"));
        assert!(!schema.conforms("Seqid", "chr 1"));
        assert!(!schema.conforms("Seqid", ""));
    }

    #[test]
    fn test_score_and_phase() {
        let schema = GffSchema::new();
        assert!(schema.conforms("score", "0.95"));
        assert!(schema.conforms("score", "1e-10"));
        assert!(!schema.conforms("score", "high"));
        assert!(schema.conforms("phase", "2"));
        assert!(!schema.conforms("phase", "3"));
    }

    #[test]
    fn test_type_vocabulary_and_accessions() {
        let schema = GffSchema::with_feature_types(["gene"]);
        assert!(schema.conforms("Type", "gene"));
        assert!(schema.conforms("Type", "SO:0000704"));
        assert!(!schema.conforms("Type", "mRNA"));
        assert_eq!(schema.permissible_values("Type"), ["gene".to_string()]);
        assert!(schema.permissible_values("Seqid").is_empty());
    }

    #[test]
    fn test_attribute_slots() {
        let schema = GffSchema::new();
        // reserved names and the lowercase application namespace are known
        assert!(schema.has_type("Parent"));
        assert!(schema.has_type("gene_id"));
        // unknown uppercase names are not
        assert!(!schema.has_type("Progenitor"));
    }
}
