use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::DnsRecordType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tracked_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub provider: String,
    pub provider_record_id: String,
    pub record_type: DnsRecordType,
    pub name: String,
    pub content: String,
    pub ttl: i32,
    pub app_managed: bool,
    pub orphaned_at: Option<DateTimeUtc>,
    pub first_seen_at: DateTimeUtc,
    pub last_updated_at: DateTimeUtc,
    pub extras_json: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
