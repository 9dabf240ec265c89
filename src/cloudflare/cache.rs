use crate::cloudflare::model::{DnsRecordHandle, Zone};
use std::collections::HashMap;
use std::rc::Rc;

/// Read cache of zones and of the records of each zone, keyed by zone name.
/// Nothing is ever invalidated.
pub struct Cache {
    zones: Vec<Rc<Zone>>,
    dns_records: HashMap<String, Vec<DnsRecordHandle>>,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            dns_records: HashMap::new(),
        }
    }

    // An empty zone list is indistinguishable from one never fetched.
    pub fn zones_cached(&self) -> bool {
        !self.zones.is_empty()
    }

    pub fn get_zones(&self) -> Vec<Rc<Zone>> {
        self.zones.clone()
    }

    pub fn set_zones(&mut self, zones: Vec<Rc<Zone>>) {
        self.zones = zones;
    }

    pub fn dns_records_cached(&self, zone_name: &str) -> bool {
        self.dns_records.contains_key(zone_name)
    }

    pub fn get_dns_records(&self, zone_name: &str) -> Vec<DnsRecordHandle> {
        self.dns_records
            .get(zone_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_dns_records(&mut self, zone_name: &str, records: Vec<DnsRecordHandle>) {
        self.dns_records.insert(zone_name.to_string(), records);
    }

    pub fn add_dns_record(&mut self, zone_name: &str, record: DnsRecordHandle) {
        self.dns_records
            .entry(zone_name.to_string())
            .or_default()
            .push(record);
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
