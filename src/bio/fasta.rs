use crate::bio::sequence::Sequence;
use crate::BinscopeError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending, space1},
    combinator::{map_res, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map_res(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        std::str::from_utf8,
    )(input)?;
    let (input, description) = opt(preceded(
        space1,
        map_res(not_line_ending, std::str::from_utf8),
    ))(input)?;
    // The final header of a file may lack a trailing newline
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;
        // A lone '\r' is not a line ending to nom; skip it so the loop advances
        let rest = rest.strip_prefix(b"\r").unwrap_or(rest);

        sequence.extend(
            line.iter()
                .filter(|c| !c.is_ascii_whitespace())
                .map(|c| c.to_ascii_uppercase()),
        );

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], Sequence> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let mut seq = Sequence::new(id.to_string(), sequence);
    if let Some(desc) = description.filter(|d| !d.trim().is_empty()) {
        seq = seq.with_description(desc.trim_end().to_string());
    }

    Ok((input, seq))
}

/// Parse FASTA from bytes.
///
/// Records with an empty sequence are kept: every header in a bin file is a
/// contig assigned to that bin.
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<Sequence>, BinscopeError> {
    let mut input = data;
    let mut sequences = Vec::new();

    while !input.is_empty() {
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        let line_end = input.iter().position(|&c| c == b'\n').unwrap_or(input.len());
        if input[0] != b'>' {
            return Err(BinscopeError::Parse(format!(
                "line {}: expected FASTA header, found '{}'",
                line_number(data, input),
                String::from_utf8_lossy(&input[..line_end.min(40)])
            )));
        }
        if std::str::from_utf8(&input[..line_end]).is_err() {
            return Err(BinscopeError::Parse(format!(
                "line {}: FASTA header is not valid UTF-8: '{}'",
                line_number(data, input),
                String::from_utf8_lossy(&input[..line_end.min(80)]).trim_end()
            )));
        }

        match parse_record(input) {
            Ok((remaining, seq)) => {
                sequences.push(seq);
                input = remaining;
            }
            Err(e) => {
                return Err(BinscopeError::Parse(format!(
                    "line {}: failed to parse FASTA record: {:?}",
                    line_number(data, input),
                    e
                )));
            }
        }
    }

    Ok(sequences)
}

/// 1-based line of `rest` within `data`
fn line_number(data: &[u8], rest: &[u8]) -> usize {
    let consumed = data.len() - rest.len();
    data[..consumed].iter().filter(|&&c| c == b'\n').count() + 1
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>, BinscopeError> {
    let path = path.as_ref();

    let result = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)
    } else {
        parse_fasta_uncompressed(path)
    };

    result.map_err(|e| match e {
        BinscopeError::Parse(msg) => BinscopeError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<Sequence>, BinscopeError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: the map is read-only and dropped before this function returns
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_from_bytes(&mmap[..])
}

fn parse_fasta_gzip(path: &Path) -> Result<Vec<Sequence>, BinscopeError> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;

    parse_fasta_from_bytes(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        let input = b">NODE_1_length_5000_cov_12.5 flag=1 multi=3.0\nACGT";
        let (remaining, (id, desc)) = parse_header(input).unwrap();
        assert_eq!(id, "NODE_1_length_5000_cov_12.5");
        assert_eq!(desc, Some("flag=1 multi=3.0"));
        assert_eq!(remaining, b"ACGT");
    }

    #[test]
    fn test_parse_header_without_newline() {
        let (remaining, (id, desc)) = parse_header(b">contig_7").unwrap();
        assert_eq!(id, "contig_7");
        assert_eq!(desc, None);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_multiline_records() {
        let fasta = b">a first\nACGT\nacgt\n\n>b\r\nGGCC\r\n>c\n";
        let seqs = parse_fasta_from_bytes(fasta).unwrap();

        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[0].id, "a");
        assert_eq!(seqs[0].description.as_deref(), Some("first"));
        assert_eq!(seqs[0].sequence, b"ACGTACGT");
        assert_eq!(seqs[1].sequence, b"GGCC");
        assert!(seqs[2].is_empty());
    }

    #[test]
    fn test_rejects_text_before_first_header() {
        let err = parse_fasta_from_bytes(b"ACGT\n>a\nACGT\n").unwrap_err();
        assert!(matches!(err, BinscopeError::Parse(_)));
    }

    #[test]
    fn test_non_utf8_header_is_rejected() {
        assert!(parse_header(b">NODE_1\xff\nACGT").is_err());

        let err = parse_fasta_from_bytes(b">a\nACGT\n>NODE_2\xfe_x\nGG\n").unwrap_err();
        match err {
            BinscopeError::Parse(msg) => assert!(msg.starts_with("line 3:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_fasta_from_bytes(b"").unwrap().is_empty());
        assert!(parse_fasta_from_bytes(b"\n\n").unwrap().is_empty());
    }
}
