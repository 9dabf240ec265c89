use crate::cloudflare::model::DnsRecordPayload;
use crate::error::Result;
use serde::Deserialize;

/// A zone as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneResult {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub name_servers: Option<Vec<String>>,
    #[serde(default)]
    pub original_name_servers: Option<Vec<String>>,
}

/// A DNS record as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecordResult {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Remote DNS management API used by [`Manager`](crate::cloudflare::Manager).
///
/// Every call blocks until the remote side has answered.
pub trait Client {
    fn get_zones(&self) -> Result<Vec<ZoneResult>>;

    fn get_dns_records(&self, zone_id: &str) -> Result<Vec<DnsRecordResult>>;

    /// Creates a record and returns the id the remote side assigned to it.
    fn add_dns_record(&self, zone_id: &str, record: &DnsRecordPayload<'_>) -> Result<String>;

    fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecordPayload<'_>,
    ) -> Result<()>;

    /// Purges the zone's edge cache on the remote side.
    fn purge_cache(&self, zone_id: &str) -> Result<()>;
}
