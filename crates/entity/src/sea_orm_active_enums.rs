use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "dns_record_type")]
pub enum DnsRecordType {
    #[sea_orm(string_value = "A")]
    A,
    #[sea_orm(string_value = "AAAA")]
    Aaaa,
    #[sea_orm(string_value = "CNAME")]
    Cname,
    #[sea_orm(string_value = "MX")]
    Mx,
    #[sea_orm(string_value = "TXT")]
    Txt,
    #[sea_orm(string_value = "SRV")]
    Srv,
    #[sea_orm(string_value = "CAA")]
    Caa,
    #[sea_orm(string_value = "NS")]
    Ns,
}

impl DnsRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::Aaaa => "AAAA",
            DnsRecordType::Cname => "CNAME",
            DnsRecordType::Mx => "MX",
            DnsRecordType::Txt => "TXT",
            DnsRecordType::Srv => "SRV",
            DnsRecordType::Caa => "CAA",
            DnsRecordType::Ns => "NS",
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DnsRecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(DnsRecordType::A),
            "AAAA" => Ok(DnsRecordType::Aaaa),
            "CNAME" => Ok(DnsRecordType::Cname),
            "MX" => Ok(DnsRecordType::Mx),
            "TXT" => Ok(DnsRecordType::Txt),
            "SRV" => Ok(DnsRecordType::Srv),
            "CAA" => Ok(DnsRecordType::Caa),
            "NS" => Ok(DnsRecordType::Ns),
            other => Err(format!("invalid record type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "record_source")]
pub enum RecordSource {
    #[sea_orm(string_value = "discovered")]
    Discovered,
    #[sea_orm(string_value = "managed")]
    Managed,
}
