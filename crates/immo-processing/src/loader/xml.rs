//! XML input through quick-xml.
//!
//! Expected shape: a root element containing one element per record. Child
//! elements of a record and its attributes become columns:
//!
//! ```xml
//! <data>
//!   <row id="1"><price>300000</price><postCode>1000</postCode></row>
//! </data>
//! ```

use super::string_frame;
use crate::error::{CleaningError, Result};
use polars::prelude::DataFrame;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::path::Path;

const RECORD_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

fn xml_err(e: impl std::fmt::Display) -> CleaningError {
    CleaningError::Xml(e.to_string())
}

/// Column registry keeping first-seen order.
#[derive(Default)]
struct Columns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Columns {
    fn slot(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }
}

type Record = HashMap<usize, String>;

fn record_from_attributes(
    start: &quick_xml::events::BytesStart<'_>,
    columns: &mut Columns,
) -> Result<Record> {
    let mut record = Record::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = unescape(&raw).map_err(xml_err)?.trim().to_string();
        let idx = columns.slot(&key);
        if !value.is_empty() {
            record.insert(idx, value);
        }
    }
    Ok(record)
}

/// Read every record element under the document root.
pub(crate) fn read_records(path: &Path) -> Result<DataFrame> {
    // Field text is trimmed once assembled; trimming each event would eat the
    // spaces around entity references.
    let mut reader = Reader::from_file(path).map_err(xml_err)?;

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut columns = Columns::default();
    let mut records: Vec<Record> = Vec::new();
    let mut current: Option<Record> = None;
    let mut field: Option<usize> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) => {
                depth += 1;
                if depth == RECORD_DEPTH {
                    current = Some(record_from_attributes(&e, &mut columns)?);
                } else if depth == FIELD_DEPTH {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    field = Some(columns.slot(&name));
                    text.clear();
                }
            }
            Event::Empty(e) => {
                if depth + 1 == RECORD_DEPTH {
                    records.push(record_from_attributes(&e, &mut columns)?);
                } else if depth + 1 == FIELD_DEPTH {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    columns.slot(&name);
                }
            }
            Event::Text(t) if depth == FIELD_DEPTH => {
                text.push_str(&t.decode().map_err(xml_err)?);
            }
            Event::CData(t) if depth == FIELD_DEPTH => {
                text.push_str(&String::from_utf8_lossy(&t));
            }
            Event::GeneralRef(r) if depth == FIELD_DEPTH => {
                if let Some(ch) = r.resolve_char_ref().map_err(xml_err)? {
                    text.push(ch);
                } else {
                    let name = r.decode().map_err(xml_err)?;
                    if let Some(resolved) = resolve_predefined_entity(&name) {
                        text.push_str(resolved);
                    }
                }
            }
            Event::End(_) => {
                if depth == FIELD_DEPTH {
                    if let (Some(record), Some(idx)) = (current.as_mut(), field.take()) {
                        let value = text.trim();
                        if !value.is_empty() {
                            record.insert(idx, value.to_string());
                        }
                    }
                } else if depth == RECORD_DEPTH
                    && let Some(record) = current.take()
                {
                    records.push(record);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut values: Vec<Vec<Option<String>>> =
        vec![Vec::with_capacity(records.len()); columns.names.len()];
    for mut record in records {
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(record.remove(&idx));
        }
    }

    string_frame(columns.names, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(content: &str) -> Result<DataFrame> {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("listings.xml");
        std::fs::write(&path, content).unwrap();
        read_records(&path)
    }

    #[test]
    fn test_child_elements_become_columns() {
        let df = read(
            r#"<?xml version="1.0"?>
            <data>
              <row><price>300000</price><locality>Ixelles</locality></row>
              <row><price>250000</price><postCode>1050</postCode></row>
            </data>"#,
        )
        .unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        let postcode = df.column("postCode").unwrap();
        assert_eq!(postcode.null_count(), 1);
    }

    #[test]
    fn test_attributes_and_entities() {
        let df = read(
            r#"<data><row id="7"><locality>Sint-Gillis &amp; Vorst</locality></row></data>"#,
        )
        .unwrap();

        assert_eq!(df.height(), 1);
        let id = df.column("id").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(id, Some("7"));
        let locality = df.column("locality").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(locality, Some("Sint-Gillis & Vorst"));
    }

    #[test]
    fn test_padded_text_around_entities() {
        let df = read(
            "<data>\n  <row>\n    <street>  Rue &lt;Haute&gt; &#38; Co  </street>\n  </row>\n</data>",
        )
        .unwrap();

        let street = df.column("street").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(street, Some("Rue <Haute> & Co"));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(matches!(
            read("<data><row><price>1</row></data>"),
            Err(CleaningError::Xml(_))
        ));
    }
}
