/// Number of tab-separated fields in a GFF3 feature line.
pub const GFF3_FIELD_COUNT: usize = 9;

#[derive(Debug, Clone, Copy)]
/// The nine positional values of one non-comment GFF3 line, borrowed
/// from the line buffer. A record is transient; it exists only for the
/// duration of one line's validation and carries the raw strings, not
/// parsed values, so that every field rule can report the offending
/// text verbatim.
pub struct FeatureRecord<'a> {
    pub seqid: &'a str,
    pub source: &'a str,
    pub feature_type: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub score: &'a str,
    pub strand: &'a str,
    pub phase: &'a str,
    pub raw_attributes: &'a str,
}

#[derive(Debug, Clone, Copy)]
/// Classification of one input line.
pub enum ParsedLine<'a> {
    /// A line whose first non-whitespace character is `#`. Skipped
    /// entirely; a comment can produce no finding.
    Comment,
    /// A line with exactly [GFF3_FIELD_COUNT] tab-separated fields.
    Record(FeatureRecord<'a>),
    /// Any other non-comment line, including blank lines (which split
    /// into a single empty field). `fields` is the observed count.
    Malformed { fields: usize },
}

/// Splits one raw line into its structural classification. The line is
/// trimmed first, so carriage returns from CRLF input do not leak into
/// the last field.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let line = line.trim();
    if line.starts_with('#') {
        return ParsedLine::Comment;
    }
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != GFF3_FIELD_COUNT {
        return ParsedLine::Malformed {
            fields: fields.len(),
        };
    }
    ParsedLine::Record(FeatureRecord {
        seqid: fields[0],
        source: fields[1],
        feature_type: fields[2],
        start: fields[3],
        end: fields[4],
        score: fields[5],
        strand: fields[6],
        phase: fields[7],
        raw_attributes: fields[8],
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The value of one attribute: either the text after the first `=`, or
/// a boolean flag for a bare key with no `=`.
pub enum AttrValue<'a> {
    Text(&'a str),
    Flag,
}

impl<'a> AttrValue<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            AttrValue::Text(v) => Some(v),
            AttrValue::Flag => None,
        }
    }
}

#[derive(Debug, Default)]
/// The ordered key/value mapping parsed from the ninth field of a
/// feature line.
///
/// Keys keep the order of their first occurrence. A duplicate key
/// overwrites the earlier value in place; last occurrence wins. That is
/// the defined behavior of this parser, not an accident of the backing
/// store. Multi-valued attributes such as `Parent` or `Alias` are kept
/// as their raw comma-joined text; each rule splits the value itself.
///
/// # Examples
///
/// ```rust
/// use gffcheck::record::{AttrValue, AttributeMap};
///
/// let attrs = AttributeMap::parse("ID=mrna1;Parent=gene1;basic");
/// assert_eq!(attrs.get("ID"), Some(AttrValue::Text("mrna1")));
/// assert_eq!(attrs.get("basic"), Some(AttrValue::Flag));
/// assert_eq!(attrs.len(), 3);
/// ```
pub struct AttributeMap<'a> {
    entries: Vec<(&'a str, AttrValue<'a>)>,
}

impl<'a> AttributeMap<'a> {
    /// Splits `raw` on `;`, then each non-empty segment on its first
    /// `=`. Segments without `=` become boolean flags.
    pub fn parse(raw: &'a str) -> AttributeMap<'a> {
        let mut map = AttributeMap {
            entries: Vec::new(),
        };
        for segment in raw.split(';') {
            if segment.is_empty() {
                continue;
            }
            match segment.split_once('=') {
                Some((key, value)) => map.insert(key, AttrValue::Text(value)),
                None => map.insert(segment, AttrValue::Flag),
            }
        }
        map
    }

    fn insert(&mut self, key: &'a str, value: AttrValue<'a>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<AttrValue<'a>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Iterates over `(key, value)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, AttrValue<'a>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD_LINE: &str =
        "chr1\tHAVANA\tgene\t11869\t14409\t.\t+\t.\tID=ENSG00000290825.1;gene_type=lncRNA";

    #[test]
    fn test_parse_line_record() {
        match parse_line(RECORD_LINE) {
            ParsedLine::Record(rec) => {
                assert_eq!(rec.seqid, "chr1");
                assert_eq!(rec.source, "HAVANA");
                assert_eq!(rec.feature_type, "gene");
                assert_eq!(rec.start, "11869");
                assert_eq!(rec.end, "14409");
                assert_eq!(rec.score, ".");
                assert_eq!(rec.strand, "+");
                assert_eq!(rec.phase, ".");
                assert_eq!(rec.raw_attributes, "ID=ENSG00000290825.1;gene_type=lncRNA");
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_line_comment_and_directive() {
        assert!(matches!(parse_line("# a comment"), ParsedLine::Comment));
        assert!(matches!(parse_line("##gff-version 3"), ParsedLine::Comment));
    }

    #[test]
    fn test_parse_line_malformed() {
        assert!(matches!(
            parse_line("chr1\tHAVANA\tgene"),
            ParsedLine::Malformed { fields: 3 }
        ));
        // a blank line splits into one empty field
        assert!(matches!(parse_line(""), ParsedLine::Malformed { fields: 1 }));
        // ten fields are as malformed as eight
        let ten = format!("{}\textra", RECORD_LINE);
        assert!(matches!(
            parse_line(&ten),
            ParsedLine::Malformed { fields: 10 }
        ));
    }

    #[test]
    fn test_attribute_map_order_and_flags() {
        let attrs = AttributeMap::parse("ID=g1;Note=first,second;basic;tag=x");
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ID", "Note", "basic", "tag"]);
        assert_eq!(attrs.get("Note"), Some(AttrValue::Text("first,second")));
        assert_eq!(attrs.get("basic"), Some(AttrValue::Flag));
        assert_eq!(attrs.get("missing"), None);
    }

    #[test]
    fn test_attribute_map_last_occurrence_wins() {
        let attrs = AttributeMap::parse("ID=one;Parent=p1;ID=two");
        assert_eq!(attrs.get("ID"), Some(AttrValue::Text("two")));
        // the overwritten key keeps its original position
        let keys: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ID", "Parent"]);
    }

    #[test]
    fn test_attribute_map_splits_on_first_equals_only() {
        let attrs = AttributeMap::parse("Note=a=b;;");
        assert_eq!(attrs.get("Note"), Some(AttrValue::Text("a=b")));
        assert_eq!(attrs.len(), 1);
    }
}
