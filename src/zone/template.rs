use super::constants::DEFAULT_TTL;
use crate::error::{Result, StoreError};
use serde::Deserialize;

pub const MIN_TEMPLATE_TTL: u32 = 60;
pub const MAX_TEMPLATE_TTL: u32 = 2_147_483_647;

/// Parameters for a freshly generated zone file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneTemplate {
    pub zone_name: String,
    pub admin_email: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

impl ZoneTemplate {
    pub fn new(zone_name: impl Into<String>, admin_email: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            admin_email: admin_email.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn check(&self) -> Result<()> {
        let name_ok = !self.zone_name.is_empty()
            && self
                .zone_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-');
        if !name_ok {
            return Err(StoreError::InvalidInput(format!(
                "Invalid zone name: {}",
                self.zone_name
            )));
        }

        if !looks_like_email(&self.admin_email) {
            return Err(StoreError::InvalidInput(format!(
                "Invalid admin email: {}",
                self.admin_email
            )));
        }

        if !(MIN_TEMPLATE_TTL..=MAX_TEMPLATE_TTL).contains(&self.ttl) {
            return Err(StoreError::InvalidInput(format!(
                "TTL must be between {} and {}",
                MIN_TEMPLATE_TTL, MAX_TEMPLATE_TTL
            )));
        }

        Ok(())
    }

    /// Render the starter zone with the given SOA serial
    pub fn render(&self, serial: u64) -> String {
        let zone = &self.zone_name;
        let admin = self.admin_email.replacen('@', ".", 1);

        format!(
            "$TTL {ttl}
@       IN      SOA     {zone}. {admin}. (
                        {serial}       ; Serial
                        3600            ; Refresh
                        1800            ; Retry
                        1209600         ; Expire
                        86400 )         ; Minimum TTL

; Name servers
@       IN      NS      ns1.{zone}.
@       IN      NS      ns2.{zone}.

; A records
@       IN      A       192.168.1.10
ns1     IN      A       192.168.1.10
ns2     IN      A       192.168.1.11
www     IN      A       192.168.1.10

; CNAME records
mail    IN      CNAME   @
ftp     IN      CNAME   @
",
            ttl = self.ttl,
        )
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
