//! CSV dataset → [`Document`] transformation.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::DataError;
use crate::layout::Layout;

/// One row of a dataset, keyed by its layout's field names.
///
/// Values are the CSV cells copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    layout: Layout,
    values: Vec<String>,
}

impl Record {
    fn from_row(layout: Layout, row: &StringRecord, line: u64) -> Result<Self, DataError> {
        let required = layout.required_columns();
        if row.len() < required {
            return Err(DataError::MissingColumns {
                line,
                required,
                found: row.len(),
            });
        }

        let values = layout
            .fields()
            .iter()
            .map(|(_, column)| row[*column].to_owned())
            .collect();
        Ok(Self { layout, values })
    }

    /// Value of a field, if the layout has it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// `(field, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.layout
            .field_names()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// All records of one dataset, in source row order.
///
/// Serializes as a JSON array of objects.
#[derive(Debug, Clone)]
pub struct Document {
    identifier: String,
    layout: Layout,
    records: Vec<Record>,
}

impl Document {
    /// Dataset identifier this document was built from.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Layout shared by every record.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize to compact JSON text.
    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

/// Load `<data_dir>/<identifier>.csv` into a [`Document`].
///
/// # Errors
///
/// - [`DataError::UnknownDataset`] if no layout is registered for `identifier`
/// - [`DataError::NotFound`] if the CSV file is missing
/// - [`DataError::MissingColumns`] if any row is too short; no partial
///   document is returned
pub fn load_document(data_dir: &Path, identifier: &str) -> Result<Document, DataError> {
    let layout = Layout::for_dataset(identifier)
        .ok_or_else(|| DataError::UnknownDataset(identifier.to_owned()))?;

    let path = data_dir.join(format!("{identifier}.csv"));
    let file = File::open(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataError::NotFound(path.clone()),
        _ => DataError::Io(e),
    })?;

    let document = read_document(identifier, layout, file)?;
    tracing::debug!(
        dataset = identifier,
        path = %path.display(),
        records = document.len(),
        "Loaded dataset"
    );
    Ok(document)
}

/// Build a [`Document`] from CSV text read from `reader`.
///
/// The first row is always treated as a header and skipped. An empty line
/// after the header is a row with no columns and fails the whole file.
pub fn read_document<R: Read>(
    identifier: &str,
    layout: Layout,
    mut reader: R,
) -> Result<Document, DataError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_slice());

    // The reader drops empty lines, so each record's start offset and the
    // end of the previous record still point at the first one it skipped.
    csv.headers()?;
    let mut end = csv.position().clone();

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    while csv.read_record(&mut row)? {
        let start = row.position().unwrap_or(&end);
        if let Some(line) = blank_line_at(&input, start) {
            return Err(empty_row(layout, line));
        }
        records.push(Record::from_row(layout, &row, start.line())?);
        end = csv.position().clone();
    }
    if let Some(line) = blank_line_at(&input, &end) {
        return Err(empty_row(layout, line));
    }

    Ok(Document {
        identifier: identifier.to_owned(),
        layout,
        records,
    })
}

/// Line number of an empty line starting at `position`, if there is one.
///
/// A record ended by `\r\n` stops after the `\r`, so a lone `\n` right
/// after a `\r` completes that terminator rather than opening a line.
fn blank_line_at(input: &[u8], position: &csv::Position) -> Option<u64> {
    let offset = usize::try_from(position.byte()).ok()?;
    let mut rest = input.get(offset..)?;
    let mut line = position.line();
    if offset.checked_sub(1).and_then(|i| input.get(i)) == Some(&b'\r') {
        if let Some(after) = rest.strip_prefix(b"\n") {
            rest = after;
            line += 1;
        }
    }
    matches!(rest.first(), Some(b'\n' | b'\r')).then_some(line)
}

fn empty_row(layout: Layout, line: u64) -> DataError {
    DataError::MissingColumns {
        line,
        required: layout.required_columns(),
        found: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    const BEST_PICTURE_CSV: &str = "\
movie,image,t1,u1,t2,u2,t3,u3,t4,u4
Argo,argo.jpg,Review,http://n.pr/a1,Interview,http://n.pr/a2,Music,http://n.pr/a3,Book,http://n.pr/a4
Lincoln,lincoln.jpg,Review,http://n.pr/l1,,,,,,
\"Les Misérables\",les-mis.jpg,\"Review, part 1\",http://n.pr/m1,x,y,z,w,q,r
";

    const BEST_ACTOR_CSV: &str = "\
actor,image,title,url
Daniel Day-Lewis,ddl.jpg,Profile,http://n.pr/ddl
Hugh Jackman,hj.jpg,Profile,http://n.pr/hj
";

    fn best_picture() -> Document {
        read_document("best-picture", Layout::FourLink, BEST_PICTURE_CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_row_count_and_order() {
        let doc = best_picture();
        assert_eq!(doc.len(), 3);
        let names: Vec<_> = doc
            .records()
            .iter()
            .map(|r| r.get("movie_name").unwrap())
            .collect();
        assert_eq!(names, vec!["Argo", "Lincoln", "Les Misérables"]);
    }

    #[test]
    fn test_four_link_record_fields_verbatim() {
        let doc = best_picture();
        let argo = &doc.records()[0];
        assert_eq!(argo.len(), 11);
        assert_eq!(argo.get("sort"), Some("Argo"));
        assert_eq!(argo.get("movie_name"), Some("Argo"));
        assert_eq!(argo.get("img_filename"), Some("argo.jpg"));
        assert_eq!(argo.get("link1_title"), Some("Review"));
        assert_eq!(argo.get("link4_url"), Some("http://n.pr/a4"));

        let lincoln = &doc.records()[1];
        assert_eq!(lincoln.get("link2_title"), Some(""));

        let les_mis = &doc.records()[2];
        assert_eq!(les_mis.get("link1_title"), Some("Review, part 1"));
    }

    #[test]
    fn test_one_link_record_has_five_keys() {
        let doc =
            read_document("best-actor", Layout::OneLink, BEST_ACTOR_CSV.as_bytes()).unwrap();
        assert_eq!(doc.len(), 2);

        let json: Vec<HashMap<String, String>> =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let mut keys: Vec<_> = json[0].keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["img_filename", "link1_title", "link1_url", "movie_name", "sort"]
        );
        assert_eq!(json[1]["link1_url"], "http://n.pr/hj");
    }

    #[test]
    fn test_json_round_trip_matches_records() {
        let doc = best_picture();
        let parsed: Vec<HashMap<String, String>> =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(parsed.len(), doc.len());
        for (object, record) in parsed.iter().zip(doc.records()) {
            assert_eq!(object.len(), record.len());
            for (field, value) in record.iter() {
                assert_eq!(object[field], value);
            }
        }
    }

    #[test]
    fn test_json_keys_in_layout_order() {
        let doc =
            read_document("best-actor", Layout::OneLink, BEST_ACTOR_CSV.as_bytes()).unwrap();
        let json = doc.to_json().unwrap();
        assert!(json.starts_with(
            "[{\"sort\":\"Daniel Day-Lewis\",\"movie_name\":\"Daniel Day-Lewis\",\"img_filename\""
        ));
    }

    #[test]
    fn test_short_row_fails_whole_file() {
        let csv = "h1,h2,h3,h4\nok,ok.jpg,t,u\nshort,short.jpg\nok2,ok2.jpg,t,u\n";
        let err = read_document("best-actor", Layout::OneLink, csv.as_bytes()).unwrap_err();
        match err {
            DataError::MissingColumns {
                line,
                required,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(required, 4);
                assert_eq!(found, 2);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_line_fails_whole_file() {
        let csv = "h1,h2,h3,h4\nok,ok.jpg,t,u\n\nok2,ok2.jpg,t,u\n";
        let err = read_document("best-actor", Layout::OneLink, csv.as_bytes()).unwrap_err();
        assert!(
            matches!(
                err,
                DataError::MissingColumns {
                    line: 3,
                    required: 4,
                    found: 0
                }
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn test_blank_line_crlf_fails_whole_file() {
        let csv = "h1,h2,h3,h4\r\nok,ok.jpg,t,u\r\n\r\nok2,ok2.jpg,t,u\r\n";
        let err = read_document("best-actor", Layout::OneLink, csv.as_bytes()).unwrap_err();
        assert!(
            matches!(err, DataError::MissingColumns { found: 0, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_trailing_blank_line_fails_whole_file() {
        let csv = "h1,h2,h3,h4\nok,ok.jpg,t,u\n\n";
        let err = read_document("best-actor", Layout::OneLink, csv.as_bytes()).unwrap_err();
        assert!(
            matches!(err, DataError::MissingColumns { found: 0, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_crlf_without_blank_lines_loads() {
        let csv = "h1,h2,h3,h4\r\nok,ok.jpg,t,u\r\nok2,ok2.jpg,t,u\r\n";
        let doc = read_document("best-actor", Layout::OneLink, csv.as_bytes()).unwrap();
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_quoted_newline_is_not_a_blank_line() {
        let csv = "h1,h2,h3,h4\nok,ok.jpg,\"two\n\nparas\",u\n";
        let doc = read_document("best-actor", Layout::OneLink, csv.as_bytes()).unwrap();
        assert_eq!(doc.records()[0].get("link1_title"), Some("two\n\nparas"));
    }

    #[test]
    fn test_header_only_yields_empty_document() {
        let doc = read_document("best-actor", Layout::OneLink, "a,b,c,d\n".as_bytes()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_load_document_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best-actor.csv"), BEST_ACTOR_CSV).unwrap();

        let doc = load_document(dir.path(), "best-actor").unwrap();
        assert_eq!(doc.identifier(), "best-actor");
        assert_eq!(doc.layout(), Layout::OneLink);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_load_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(dir.path(), "best-picture").unwrap_err();
        assert!(matches!(err, DataError::NotFound(ref p) if p.ends_with("best-picture.csv")));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_document_unknown_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("best-director.csv"), "a\nb\n").unwrap();
        let err = load_document(dir.path(), "best-director").unwrap_err();
        assert!(matches!(err, DataError::UnknownDataset(_)));
    }
}
