use serde::Serialize;
use std::fmt;

/// Record class. Only the Internet class is ever produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RecordClass {
    #[default]
    #[serde(rename = "IN")]
    In,
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("IN"),
        }
    }
}

/// A resource record extracted from zone file text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Owner name as written, `@` when the line omits it
    pub name: String,
    /// Explicit TTL or the `$TTL` in effect for this line
    pub ttl: u32,
    pub class: RecordClass,
    /// Record type, uppercased
    #[serde(rename = "type")]
    pub rtype: String,
    /// Everything after the type token, trimmed
    pub value: String,
    /// 1-based line number in the source text
    pub line: usize,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        ttl: u32,
        rtype: &str,
        value: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            ttl,
            class: RecordClass::In,
            rtype: rtype.to_uppercase(),
            value: value.into(),
            line,
        }
    }

    /// Check whether the record has the given type, ignoring case
    pub fn is_type(&self, rtype: &str) -> bool {
        self.rtype.eq_ignore_ascii_case(rtype)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.class, self.rtype, self.value
        )
    }
}
