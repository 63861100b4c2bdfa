use dnsguard_events::RecordType;
use entity::sea_orm_active_enums::DnsRecordType;

pub(crate) fn to_entity_type(rt: RecordType) -> DnsRecordType {
    match rt {
        RecordType::A => DnsRecordType::A,
        RecordType::Aaaa => DnsRecordType::Aaaa,
        RecordType::Cname => DnsRecordType::Cname,
        RecordType::Mx => DnsRecordType::Mx,
        RecordType::Txt => DnsRecordType::Txt,
        RecordType::Srv => DnsRecordType::Srv,
        RecordType::Caa => DnsRecordType::Caa,
        RecordType::Ns => DnsRecordType::Ns,
    }
}

pub(crate) fn from_entity_type(rt: DnsRecordType) -> RecordType {
    match rt {
        DnsRecordType::A => RecordType::A,
        DnsRecordType::Aaaa => RecordType::Aaaa,
        DnsRecordType::Cname => RecordType::Cname,
        DnsRecordType::Mx => RecordType::Mx,
        DnsRecordType::Txt => RecordType::Txt,
        DnsRecordType::Srv => RecordType::Srv,
        DnsRecordType::Caa => RecordType::Caa,
        DnsRecordType::Ns => RecordType::Ns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for rt in [
            RecordType::A,
            RecordType::Aaaa,
            RecordType::Cname,
            RecordType::Mx,
            RecordType::Txt,
            RecordType::Srv,
            RecordType::Caa,
            RecordType::Ns,
        ] {
            assert_eq!(from_entity_type(to_entity_type(rt)), rt);
        }
    }
}
