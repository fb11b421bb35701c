//! The v3 source map document.

use crate::{vlq, MappingTable, SourceMapError};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A v3 source map as written next to a generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapV3 {
    pub version: u32,
    pub file: String,
    #[serde(default)]
    pub source_root: String,
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

/// One decoded `mappings` segment with absolute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSegment {
    pub generated_line: u32,
    pub generated_column: u32,
    pub source_index: Option<u32>,
    pub original_line: u32,
    pub original_column: u32,
    pub name_index: Option<u32>,
}

/// Result of [`SourceMapV3::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition<'a> {
    pub source: &'a str,
    pub line: u32,
    pub column: u32,
    pub name: Option<&'a str>,
}

impl SourceMapV3 {
    /// Serializes a mapping table.
    ///
    /// Sources and names are listed in order of first reference. Entries
    /// whose original line or column is unknown produce no segment.
    pub fn from_table(file: &str, source_root: &str, table: &MappingTable) -> Self {
        let mut sources: IndexSet<&str> = IndexSet::new();
        let mut names: IndexSet<&str> = IndexSet::new();
        let mut mappings = String::new();

        let mut line = 0u32;
        let mut first_in_line = true;
        let mut prev_column = 0i64;
        let mut prev_source = 0i64;
        let mut prev_original_line = 0i64;
        let mut prev_original_column = 0i64;
        let mut prev_name = 0i64;

        for entry in table.entries().iter().filter(|e| e.has_original()) {
            while line < entry.generated.line {
                mappings.push(';');
                line += 1;
                first_in_line = true;
                prev_column = 0;
            }
            if !first_in_line {
                mappings.push(',');
            }
            first_in_line = false;

            let column = i64::from(entry.generated.column);
            let (source, _) = sources.insert_full(entry.source.as_str());
            let source = source as i64;
            let original_line = i64::from(entry.original_line);
            let original_column = i64::from(entry.original_column);

            vlq::encode_into(column - prev_column, &mut mappings);
            vlq::encode_into(source - prev_source, &mut mappings);
            vlq::encode_into(original_line - prev_original_line, &mut mappings);
            vlq::encode_into(original_column - prev_original_column, &mut mappings);
            if let Some(name) = &entry.name {
                let (name, _) = names.insert_full(name.as_str());
                let name = name as i64;
                vlq::encode_into(name - prev_name, &mut mappings);
                prev_name = name;
            }

            prev_column = column;
            prev_source = source;
            prev_original_line = original_line;
            prev_original_column = original_column;
        }

        Self {
            version: 3,
            file: file.to_string(),
            source_root: source_root.to_string(),
            sources: sources.into_iter().map(str::to_string).collect(),
            names: names.into_iter().map(str::to_string).collect(),
            mappings,
        }
    }

    pub fn to_json(&self) -> String {
        // Serializing plain strings and integers cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, SourceMapError> {
        let map: Self = serde_json::from_str(json)?;
        if map.version != 3 {
            return Err(SourceMapError::Version(map.version));
        }
        Ok(map)
    }

    /// Decodes `mappings` into absolute segments.
    pub fn decode_mappings(&self) -> Result<Vec<DecodedSegment>, SourceMapError> {
        let mut segments = Vec::new();
        let mut source = 0i64;
        let mut original_line = 0i64;
        let mut original_column = 0i64;
        let mut name = 0i64;

        for (line, group) in self.mappings.split(';').enumerate() {
            let mut column = 0i64;
            for segment in group.split(',').filter(|s| !s.is_empty()) {
                let fields = decode_fields(segment)?;
                column += fields[0];
                let mut decoded = DecodedSegment {
                    generated_line: line as u32,
                    generated_column: column as u32,
                    source_index: None,
                    original_line: 0,
                    original_column: 0,
                    name_index: None,
                };
                match fields.len() {
                    1 => {}
                    4 | 5 => {
                        source += fields[1];
                        original_line += fields[2];
                        original_column += fields[3];
                        check_index("source", source, self.sources.len())?;
                        decoded.source_index = Some(source as u32);
                        decoded.original_line = original_line as u32;
                        decoded.original_column = original_column as u32;
                        if let Some(delta) = fields.get(4) {
                            name += delta;
                            check_index("name", name, self.names.len())?;
                            decoded.name_index = Some(name as u32);
                        }
                    }
                    n => return Err(SourceMapError::SegmentArity(n)),
                }
                segments.push(decoded);
            }
        }
        Ok(segments)
    }

    /// Finds the original position for a generated line and column: the last
    /// segment on that line starting at or before `column`.
    pub fn lookup(
        &self,
        line: u32,
        column: u32,
    ) -> Result<Option<OriginalPosition<'_>>, SourceMapError> {
        let segments = self.decode_mappings()?;
        let found = segments
            .iter()
            .filter(|s| s.generated_line == line && s.generated_column <= column)
            .last()
            .and_then(|s| {
                let source = self.sources.get(s.source_index? as usize)?;
                Some(OriginalPosition {
                    source: source.as_str(),
                    line: s.original_line,
                    column: s.original_column,
                    name: s
                        .name_index
                        .and_then(|n| self.names.get(n as usize))
                        .map(String::as_str),
                })
            });
        Ok(found)
    }
}

fn check_index(kind: &'static str, index: i64, len: usize) -> Result<(), SourceMapError> {
    if index < 0 || index as usize >= len {
        return Err(SourceMapError::IndexOutOfRange { kind, index });
    }
    Ok(())
}

fn decode_fields(segment: &str) -> Result<Vec<i64>, SourceMapError> {
    let mut fields = Vec::with_capacity(5);
    let mut rest = segment;
    while !rest.is_empty() {
        let (value, consumed) = vlq::decode(rest)?;
        fields.push(value);
        rest = &rest[consumed..];
    }
    Ok(fields)
}
