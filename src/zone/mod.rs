pub mod parser;
pub mod record;
pub mod template;
pub mod validator;

pub use parser::{ParseState, RecordParser};
pub use record::{Record, RecordClass};
pub use template::ZoneTemplate;
pub use validator::ZoneValidator;

/// Zone constants
pub mod constants {
    /// TTL in effect before any `$TTL` directive (1 day)
    pub const DEFAULT_TTL: u32 = 86400;

    /// Origin in effect before any `$ORIGIN` directive
    pub const DEFAULT_ORIGIN: &str = "@";

    /// Record types accepted after an `IN` class token
    pub const KNOWN_RECORD_TYPES: [&str; 9] =
        ["A", "AAAA", "CNAME", "MX", "NS", "PTR", "SOA", "SRV", "TXT"];
}
