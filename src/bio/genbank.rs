//! Line-oriented GenBank reader.
//!
//! Covers what antiSMASH writes into its result files: the LOCUS line,
//! structured comments (`##antiSMASH-Data-START##` blocks inside COMMENT),
//! and the feature table with qualifiers. Sequence data after ORIGIN is
//! skipped.

use crate::BinscopeError;
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, one_of},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{delimited, preceded},
    IResult,
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Column where feature keys start
const FEATURE_KEY_COLUMN: usize = 5;
/// Column where keyword values (and COMMENT text) start
const KEYWORD_VALUE_COLUMN: usize = 12;

/// A contiguous feature span in 0-based, half-open coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLocation {
    pub start: u64,
    pub end: u64,
}

impl FeatureLocation {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub key: String,
    pub location: String,
    pub qualifiers: Vec<(String, String)>,
}

impl Feature {
    fn new(key: &str, location: &str) -> Self {
        Self {
            key: key.to_string(),
            location: location.to_string(),
            qualifiers: Vec::new(),
        }
    }

    /// First value of a qualifier, as most annotation tools only set one
    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parse the location as a single span.
    ///
    /// Accepts `a..b`, a single base `a`, and `complement(...)` of either;
    /// the partial markers `<` and `>` are dropped. Compound locations such
    /// as `join(...)` are rejected.
    pub fn span(&self) -> Result<FeatureLocation, BinscopeError> {
        let (_, location) = all_consuming(parse_location)(self.location.as_str()).map_err(|_| {
            BinscopeError::Parse(format!(
                "Unsupported location '{}' on {} feature",
                self.location, self.key
            ))
        })?;

        if location.end < location.start {
            return Err(BinscopeError::Parse(format!(
                "Location '{}' on {} feature ends before it starts",
                self.location, self.key
            )));
        }
        Ok(location)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenBankRecord {
    pub name: String,
    pub length: Option<u64>,
    /// Structured comment blocks keyed by their name (`antiSMASH-Data`)
    pub structured_comments: IndexMap<String, IndexMap<String, String>>,
    pub features: Vec<Feature>,
}

impl GenBankRecord {
    pub fn structured_comment(&self, block: &str, key: &str) -> Option<&str> {
        self.structured_comments
            .get(block)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
    }

    pub fn features_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Feature> + 'a {
        self.features.iter().filter(move |f| f.key == key)
    }
}

fn parse_bound(input: &str) -> IResult<&str, u64> {
    preceded(opt(one_of("<>")), map_res(digit1, str::parse::<u64>))(input)
}

fn parse_range(input: &str) -> IResult<&str, (u64, u64)> {
    let (input, first) = parse_bound(input)?;
    let (input, last) = opt(preceded(tag(".."), parse_bound))(input)?;
    Ok((input, (first, last.unwrap_or(first))))
}

fn parse_location(input: &str) -> IResult<&str, FeatureLocation> {
    map(
        alt((delimited(tag("complement("), parse_range, tag(")")), parse_range)),
        |(first, last)| FeatureLocation {
            start: first.saturating_sub(1),
            end: last,
        },
    )(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Comment,
    Features,
    Origin,
}

/// Accumulates one record while its lines are being read
struct RecordBuilder {
    record: GenBankRecord,
    section: Section,
    comment: Vec<String>,
    /// A quoted qualifier value still waiting for its closing quote
    open_quote: bool,
}

impl RecordBuilder {
    fn new(locus_line: &str) -> Self {
        let mut tokens = locus_line.split_whitespace().skip(1);
        let name = tokens.next().unwrap_or_default().to_string();
        let length = tokens.next().and_then(|t| t.parse::<u64>().ok());

        Self {
            record: GenBankRecord {
                name,
                length,
                ..Default::default()
            },
            section: Section::Header,
            comment: Vec::new(),
            open_quote: false,
        }
    }

    fn push_line(&mut self, line: &str, line_no: usize) -> Result<(), BinscopeError> {
        if line.trim().is_empty() {
            return Ok(());
        }

        // A keyword in column 0 starts a new section
        if !line.starts_with(' ') {
            let keyword = line.split_whitespace().next().unwrap_or_default();
            self.section = match keyword {
                "COMMENT" => {
                    self.comment.push(column(line, KEYWORD_VALUE_COLUMN).to_string());
                    Section::Comment
                }
                "FEATURES" => Section::Features,
                "ORIGIN" => Section::Origin,
                _ => Section::Header,
            };
            return Ok(());
        }

        match self.section {
            Section::Comment => {
                self.comment.push(column(line, KEYWORD_VALUE_COLUMN).to_string());
            }
            Section::Features => self.push_feature_line(line, line_no)?,
            Section::Header | Section::Origin => {}
        }
        Ok(())
    }

    fn push_feature_line(&mut self, line: &str, line_no: usize) -> Result<(), BinscopeError> {
        let is_new_feature = line
            .get(..FEATURE_KEY_COLUMN)
            .is_some_and(|indent| indent.trim().is_empty())
            && column(line, FEATURE_KEY_COLUMN)
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace());

        if is_new_feature && !self.open_quote {
            // Split on whitespace rather than the value column: keys longer
            // than 15 characters push the location to the right
            let entry = column(line, FEATURE_KEY_COLUMN).trim();
            let (key, location) = entry.split_once(char::is_whitespace).unwrap_or((entry, ""));
            self.record
                .features
                .push(Feature::new(key, location.trim()));
            return Ok(());
        }

        let feature = self.record.features.last_mut().ok_or_else(|| {
            BinscopeError::Parse(format!(
                "Line {}: qualifier outside of any feature",
                line_no
            ))
        })?;
        let text = line.trim();

        if !self.open_quote && text.starts_with('/') {
            let (name, value) = match text[1..].split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => (text[1..].to_string(), String::new()),
            };
            self.open_quote = value.starts_with('"') && !closes_quote(&value[1..]);
            feature.qualifiers.push((name, value));
        } else if let Some((name, value)) = feature.qualifiers.last_mut() {
            if name != "translation" {
                value.push(' ');
            }
            value.push_str(text);
            if self.open_quote && closes_quote(text) {
                self.open_quote = false;
            }
        } else {
            // Long locations wrap before the first qualifier
            feature.location.push_str(text);
        }
        Ok(())
    }

    fn finish(mut self) -> GenBankRecord {
        for feature in &mut self.record.features {
            for (_, value) in &mut feature.qualifiers {
                *value = unquote(value);
            }
        }
        self.record.structured_comments = parse_structured_comments(&self.comment);
        self.record
    }
}

fn column(line: &str, col: usize) -> &str {
    line.get(col..).unwrap_or_default()
}

/// Whether `text` ends a quoted value, treating `""` as an escaped quote
fn closes_quote(text: &str) -> bool {
    let trailing = text.chars().rev().take_while(|&c| c == '"').count();
    trailing % 2 == 1
}

fn unquote(value: &str) -> String {
    let inner = value
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
        .unwrap_or(value);
    inner.replace("\"\"", "\"")
}

fn parse_structured_comments(lines: &[String]) -> IndexMap<String, IndexMap<String, String>> {
    let mut blocks: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
    let mut current: Option<String> = None;

    for line in lines {
        let text = line.trim();
        if let Some(name) = text
            .strip_prefix("##")
            .and_then(|t| t.strip_suffix("-START##"))
        {
            current = Some(name.to_string());
            blocks.entry(name.to_string()).or_default();
            continue;
        }
        if text.starts_with("##") && text.ends_with("-END##") {
            current = None;
            continue;
        }
        if let (Some(block), Some((key, value))) = (&current, text.split_once("::")) {
            if let Some(fields) = blocks.get_mut(block) {
                fields.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    blocks
}

/// Parse all records from GenBank text
pub fn parse_genbank_from_bytes(data: &[u8]) -> Result<Vec<GenBankRecord>, BinscopeError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| BinscopeError::Parse(format!("GenBank input is not UTF-8: {}", e)))?;

    let mut records = Vec::new();
    let mut builder: Option<RecordBuilder> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');

        if line.starts_with("//") {
            if let Some(b) = builder.take() {
                records.push(b.finish());
            }
            continue;
        }

        if line.starts_with("LOCUS") {
            if let Some(b) = builder.take() {
                records.push(b.finish());
            }
            builder = Some(RecordBuilder::new(line));
            continue;
        }

        match builder.as_mut() {
            Some(b) => b.push_line(line, line_no)?,
            None if line.trim().is_empty() => {}
            None => {
                return Err(BinscopeError::Parse(format!(
                    "Line {}: expected LOCUS, found '{}'",
                    line_no,
                    line.chars().take(40).collect::<String>()
                )))
            }
        }
    }

    if let Some(b) = builder {
        records.push(b.finish());
    }

    Ok(records)
}

/// Parse a GenBank file (supports .gz compression)
pub fn parse_genbank<P: AsRef<Path>>(path: P) -> Result<Vec<GenBankRecord>, BinscopeError> {
    let path = path.as_ref();
    let mut buffer = Vec::new();

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let file = File::open(path)?;
        GzDecoder::new(BufReader::new(file)).read_to_end(&mut buffer)?;
    } else {
        File::open(path)?.read_to_end(&mut buffer)?;
    }

    parse_genbank_from_bytes(&buffer)
}
