use super::Record;
use super::constants::{DEFAULT_ORIGIN, DEFAULT_TTL};
use tracing::{debug, trace};

/// Best-effort zone file record extractor.
///
/// Parsing never fails: lines that do not look like a record are skipped,
/// and strict checking is left to [`super::ZoneValidator`]. Parenthesized
/// multi-line records are not joined, so the continuation lines of such a
/// record come out as separate, usually spurious, records.
pub struct RecordParser;

/// Directive state threaded through the line fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    /// TTL applied to records without an explicit one
    pub ttl: u32,
    /// Last `$ORIGIN` seen. Relative names are not qualified with it.
    pub origin: String,
    pub records: Vec<Record>,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            origin: DEFAULT_ORIGIN.to_string(),
            records: Vec::new(),
        }
    }
}

impl ParseState {
    fn step(mut self, line_number: usize, raw: &str) -> Self {
        let line = raw.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with("//") {
            return self;
        }

        if let Some(rest) = line.strip_prefix("$TTL") {
            match directive_argument(rest).and_then(parse_leading_ttl) {
                Some(ttl) => {
                    trace!("Line {}: $TTL set to {}", line_number, ttl);
                    self.ttl = ttl;
                }
                None => trace!("Line {}: ignoring malformed $TTL", line_number),
            }
            return self;
        }

        if let Some(rest) = line.strip_prefix("$ORIGIN") {
            if let Some(origin) = directive_argument(rest) {
                trace!("Line {}: $ORIGIN set to {}", line_number, origin);
                self.origin = origin.to_string();
            }
            return self;
        }

        match match_record(raw, line, self.ttl, line_number) {
            Some(record) => self.records.push(record),
            None => trace!("Line {}: not a record, skipped", line_number),
        }
        self
    }
}

impl RecordParser {
    /// Extract records from zone file text in source order
    pub fn parse(content: &str) -> Vec<Record> {
        Self::parse_state(content).records
    }

    /// Extract records together with the final directive state
    pub fn parse_state(content: &str) -> ParseState {
        let state = content
            .lines()
            .enumerate()
            .fold(ParseState::default(), |state, (idx, line)| {
                state.step(idx + 1, line)
            });

        debug!(
            "Parsed {} records (final TTL {}, origin {})",
            state.records.len(),
            state.ttl,
            state.origin
        );
        state
    }
}

/// First token after a directive keyword, which must be followed by whitespace
fn directive_argument(rest: &str) -> Option<&str> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    rest.split_whitespace().next()
}

/// Leading decimal digits of a `$TTL` argument, so `3600s` reads as 3600
fn parse_leading_ttl(arg: &str) -> Option<u32> {
    let end = arg
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(arg.len());
    if end == 0 {
        return None;
    }
    arg[..end].parse().ok()
}

fn parse_ttl_token(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Whitespace-delimited tokens paired with their byte offset in `line`
fn tokens(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s, &line[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s, &line[s..]));
    }

    out
}

/// Match `[name] [ttl] [IN] <type> <value>` against a trimmed line.
///
/// The owner name is absent only when the raw line starts with whitespace.
/// The optional TTL and class fields are consumed when doing so still leaves
/// a type and some value text; otherwise they are read as the type itself.
fn match_record(raw: &str, line: &str, default_ttl: u32, line_number: usize) -> Option<Record> {
    let tokens = tokens(line);
    let (name, fields) = if raw.starts_with(char::is_whitespace) {
        (DEFAULT_ORIGIN, &tokens[..])
    } else {
        (tokens.first()?.1, &tokens[1..])
    };

    let explicit_ttl = fields.first().and_then(|(_, tok)| parse_ttl_token(tok));

    for (take_ttl, take_class) in [(true, true), (true, false), (false, true), (false, false)] {
        let mut idx = 0;
        let mut ttl = default_ttl;

        if take_ttl {
            match explicit_ttl {
                Some(value) => {
                    ttl = value;
                    idx += 1;
                }
                None => continue,
            }
        }

        if take_class {
            match fields.get(idx) {
                Some((_, "IN")) => idx += 1,
                _ => continue,
            }
        }

        // A type token and at least one value token must remain
        if fields.len() < idx + 2 {
            continue;
        }

        let (offset, rtype) = fields[idx];
        let value = line[offset + rtype.len()..].trim();
        return Some(Record::new(name, ttl, rtype, value, line_number));
    }

    None
}
