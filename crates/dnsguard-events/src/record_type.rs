use serde::{Deserialize, Serialize};

/// The DNS record kinds the core understands. Each carries a fixed rdata
/// schema beyond `content`: `MX` needs `priority`, `SRV` needs
/// `priority`/`weight`/`port`, `CAA` needs `flags`/`tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Srv,
    Caa,
    Ns,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
            RecordType::Txt => "TXT",
            RecordType::Srv => "SRV",
            RecordType::Caa => "CAA",
            RecordType::Ns => "NS",
        }
    }

    /// Whether this type's `content` is compared case-insensitively when
    /// deciding if a change is material (hostnames in CNAME/NS targets).
    pub fn content_is_case_insensitive(&self) -> bool {
        matches!(self, RecordType::Cname | RecordType::Ns)
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("invalid record type: {0}")]
pub struct ParseRecordTypeError(String);

impl std::str::FromStr for RecordType {
    type Err = ParseRecordTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            "CNAME" => Ok(RecordType::Cname),
            "MX" => Ok(RecordType::Mx),
            "TXT" => Ok(RecordType::Txt),
            "SRV" => Ok(RecordType::Srv),
            "CAA" => Ok(RecordType::Caa),
            "NS" => Ok(RecordType::Ns),
            other => Err(ParseRecordTypeError(other.to_string())),
        }
    }
}

/// Where a `RecordIntent` came from: discovered via a Hostname Source tick,
/// or pinned by an operator through `MANAGED_HOSTNAMES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSource {
    Discovered,
    Managed,
}
