//! Text record codecs for the three on-disk formats
//!
//! - raw edge list: `vertexA vertexB`, whitespace separated
//! - intermediate store: `j,k<TAB>value` with `-1` meaning the edge exists
//! - triangle output: `q,r,p` (see [`Triangle`](crate::graph::Triangle)'s `Display`)

use crate::error::{TriadError, TriadResult};
use crate::graph::{PairKey, Payload, VertexId};

/// One line of text input with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub number: u64,
    pub text: String,
}

impl InputLine {
    pub fn new(number: u64, text: impl Into<String>) -> Self {
        InputLine {
            number,
            text: text.into(),
        }
    }

    /// Number a sequence of lines starting at 1
    pub fn numbered<I, S>(lines: I) -> Vec<InputLine>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, text)| InputLine::new(i as u64 + 1, text))
            .collect()
    }
}

fn parse_vertex(line: u64, token: &str) -> TriadResult<VertexId> {
    token
        .parse::<u64>()
        .map(VertexId)
        .map_err(|e| TriadError::parse(line, format!("invalid vertex id '{}': {}", token, e)))
}

/// Decode a raw edge line into its two endpoints, in the order given.
///
/// Blank lines yield `None`. A line with a first token but no second one is
/// an error; tokens after the second are ignored.
pub fn parse_edge_line(line: u64, text: &str) -> TriadResult<Option<(VertexId, VertexId)>> {
    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let a = parse_vertex(line, first)?;
    let second = tokens
        .next()
        .ok_or_else(|| TriadError::parse(line, format!("invalid edge line {}", text)))?;
    let b = parse_vertex(line, second)?;
    Ok(Some((a, b)))
}

/// Decode a `first,second` key
pub fn parse_pair_key(line: u64, token: &str) -> TriadResult<PairKey> {
    let (first, second) = token
        .split_once(',')
        .ok_or_else(|| TriadError::parse(line, format!("invalid pair key '{}'", token)))?;
    Ok(PairKey {
        first: parse_vertex(line, first)?,
        second: parse_vertex(line, second)?,
    })
}

/// Decode an intermediate value: `-1` or a vertex id
pub fn parse_payload(line: u64, token: &str) -> TriadResult<Payload> {
    let value = token
        .parse::<i64>()
        .map_err(|e| TriadError::parse(line, format!("invalid value '{}': {}", token, e)));
    match value {
        Ok(Payload::EDGE_SENTINEL) => Ok(Payload::EdgeExists),
        Ok(v) if v < 0 => Err(TriadError::parse(line, format!("negative value {}", v))),
        // Ids above i64::MAX still round-trip as u64
        _ => parse_vertex(line, token).map(Payload::Candidate),
    }
}

/// Decode an intermediate record. Blank lines yield `None`.
pub fn parse_intermediate_line(line: u64, text: &str) -> TriadResult<Option<(PairKey, Payload)>> {
    let mut tokens = text.split_whitespace();
    let Some(key) = tokens.next() else {
        return Ok(None);
    };
    let value = tokens
        .next()
        .ok_or_else(|| TriadError::parse(line, format!("invalid intermediate line {}", text)))?;
    Ok(Some((parse_pair_key(line, key)?, parse_payload(line, value)?)))
}

/// Encode an intermediate record as `j,k<TAB>value`
pub fn format_intermediate(key: &PairKey, payload: &Payload) -> String {
    format!("{}\t{}", key, payload)
}
