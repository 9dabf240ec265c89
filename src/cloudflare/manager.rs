use crate::cloudflare::cache::Cache;
use crate::cloudflare::client::{Client, DnsRecordResult, ZoneResult};
use crate::cloudflare::model::{DnsRecord, DnsRecordHandle, Zone};
use crate::error::{Error, Result};
use std::rc::Rc;

/// Caches zones and records read through a [`Client`] and buffers record
/// writes until [`Manager::flush`] is called.
///
/// Errors returned by the client are passed through untouched. A manager is
/// meant to be driven by a single caller; it is neither `Send` nor `Sync`.
pub struct Manager<'c, C: Client + ?Sized> {
    client: &'c C,
    cache: Cache,
    records_to_create: Vec<DnsRecordHandle>,
    records_to_update: Vec<DnsRecordHandle>,
}

impl<'c, C: Client + ?Sized> Manager<'c, C> {
    pub fn new(client: &'c C) -> Manager<'c, C> {
        Manager {
            client,
            cache: Cache::new(),
            records_to_create: Vec::new(),
            records_to_update: Vec::new(),
        }
    }

    /// Returns all zones, fetching them while the cached list is still empty.
    pub fn get_zones(&mut self) -> Result<Vec<Rc<Zone>>> {
        if !self.cache.zones_cached() {
            let zones = self.fetch_zones()?;
            self.cache.set_zones(zones);
        }
        Ok(self.cache.get_zones())
    }

    /// Looks a zone up by name in the (possibly freshly fetched) zone list.
    pub fn get_zone(&mut self, name: &str) -> Result<Rc<Zone>> {
        self.get_zones()?
            .into_iter()
            .find(|zone| zone.name() == name)
            .ok_or_else(|| Error::ZoneNotFound(name.to_string()))
    }

    /// Returns the records of `zone`, fetching them on first access to the zone's name.
    pub fn get_dns_records(&mut self, zone: &Rc<Zone>) -> Result<Vec<DnsRecordHandle>> {
        if !self.cache.dns_records_cached(zone.name()) {
            let records = self.fetch_dns_records(zone)?;
            self.cache.set_dns_records(zone.name(), records);
        }
        Ok(self.cache.get_dns_records(zone.name()))
    }

    /// Stages a record for the next [`flush`](Manager::flush).
    ///
    /// Records that already exist remotely are queued for update unless an
    /// equal record is queued already. The cached record list is not touched
    /// for them. Unsaved records are queued for creation and appended to the
    /// cached list of their zone right away.
    pub fn persist_dns_record(&mut self, record: &DnsRecordHandle) {
        if record.borrow().is_persisted() {
            let staged = self
                .records_to_update
                .iter()
                .any(|staged| *staged.borrow() == *record.borrow());
            if !staged {
                self.records_to_update.push(Rc::clone(record));
            }
            return;
        }

        let zone_name = record.borrow().zone().name().to_string();
        self.cache.add_dns_record(&zone_name, Rc::clone(record));
        self.records_to_create.push(Rc::clone(record));
    }

    /// Sends every staged creation, then every staged update, in staging order.
    ///
    /// Both queues are emptied once all calls have succeeded. The first failing
    /// call aborts the flush and leaves both queues as they were, so flushing
    /// again resends the calls that did go through.
    pub fn flush(&mut self) -> Result<()> {
        for record in &self.records_to_create {
            self.add_dns_record(record)?;
        }

        for record in &self.records_to_update {
            self.update_dns_record(record)?;
        }

        log::debug!(
            "Flushed {} created and {} updated dns records",
            self.records_to_create.len(),
            self.records_to_update.len()
        );
        self.records_to_create.clear();
        self.records_to_update.clear();
        Ok(())
    }

    /// Purges the remote edge cache of `zone`. The in-memory caches are kept.
    pub fn purge_cache(&self, zone: &Zone) -> Result<()> {
        log::info!("Purging edge cache of zone {}", zone.name());
        self.client.purge_cache(zone.id())
    }

    pub fn pending_creations(&self) -> &[DnsRecordHandle] {
        &self.records_to_create
    }

    pub fn pending_updates(&self) -> &[DnsRecordHandle] {
        &self.records_to_update
    }

    fn add_dns_record(&self, record: &DnsRecordHandle) -> Result<()> {
        let id = {
            let record = record.borrow();
            log::info!(
                "Creating {} record {} -> {} in zone {}",
                record.record_type,
                record.name,
                record.content,
                record.zone().name()
            );
            self.client
                .add_dns_record(record.zone().id(), &record.payload())?
        };
        record.borrow_mut().set_id(id);
        Ok(())
    }

    fn update_dns_record(&self, record: &DnsRecordHandle) -> Result<()> {
        let record = record.borrow();
        let record_id = record.id().unwrap_or_default();
        log::info!(
            "Updating {} record {} ({}) -> {} in zone {}",
            record.record_type,
            record.name,
            record_id,
            record.content,
            record.zone().name()
        );
        self.client
            .update_dns_record(record.zone().id(), record_id, &record.payload())
    }

    fn fetch_zones(&self) -> Result<Vec<Rc<Zone>>> {
        let zones = self.client.get_zones()?;
        Ok(zones.into_iter().map(zone_from_result).collect())
    }

    fn fetch_dns_records(&self, zone: &Rc<Zone>) -> Result<Vec<DnsRecordHandle>> {
        let records = self.client.get_dns_records(zone.id())?;
        Ok(records
            .into_iter()
            .map(|record| record_from_result(zone, record))
            .collect())
    }
}

fn zone_from_result(zone: ZoneResult) -> Rc<Zone> {
    Rc::new(Zone::new(
        zone.id,
        zone.name,
        zone.status,
        zone.name_servers.unwrap_or_default(),
        zone.original_name_servers.unwrap_or_default(),
    ))
}

fn record_from_result(zone: &Rc<Zone>, record: DnsRecordResult) -> DnsRecordHandle {
    DnsRecord::new(
        Rc::clone(zone),
        record.record_type,
        record.name,
        record.content,
        record.ttl,
        record.proxied,
    )
    .with_id(record.id)
    .into_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudflare::model::DnsRecordPayload;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct CountingClient {
        zones: Vec<ZoneResult>,
        records: Vec<DnsRecordResult>,
        zone_fetches: Cell<usize>,
        record_fetches: RefCell<Vec<String>>,
        purged: RefCell<Vec<String>>,
    }

    impl Client for CountingClient {
        fn get_zones(&self) -> Result<Vec<ZoneResult>> {
            self.zone_fetches.set(self.zone_fetches.get() + 1);
            Ok(self.zones.clone())
        }

        fn get_dns_records(&self, zone_id: &str) -> Result<Vec<DnsRecordResult>> {
            self.record_fetches.borrow_mut().push(zone_id.to_string());
            Ok(self.records.clone())
        }

        fn add_dns_record(&self, _zone_id: &str, _record: &DnsRecordPayload<'_>) -> Result<String> {
            Ok("new-id".to_string())
        }

        fn update_dns_record(
            &self,
            _zone_id: &str,
            _record_id: &str,
            _record: &DnsRecordPayload<'_>,
        ) -> Result<()> {
            Ok(())
        }

        fn purge_cache(&self, zone_id: &str) -> Result<()> {
            self.purged.borrow_mut().push(zone_id.to_string());
            Ok(())
        }
    }

    fn zone_result(id: &str, name: &str) -> ZoneResult {
        ZoneResult {
            id: id.to_string(),
            name: name.to_string(),
            status: "active".to_string(),
            name_servers: None,
            original_name_servers: None,
        }
    }

    fn record_result(id: &str, name: &str) -> DnsRecordResult {
        DnsRecordResult {
            id: id.to_string(),
            record_type: "A".to_string(),
            name: name.to_string(),
            content: "1.2.3.4".to_string(),
            ttl: None,
            proxied: None,
        }
    }

    #[test]
    fn zones_are_fetched_once_when_non_empty() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);

        let first = manager.get_zones().unwrap();
        let second = manager.get_zones().unwrap();

        assert_eq!(client.zone_fetches.get(), 1);
        assert_eq!(first.len(), 1);
        assert!(Rc::ptr_eq(&first[0], &second[0]));
        assert!(first[0].name_servers().is_empty());
        assert!(first[0].original_name_servers().is_empty());
    }

    #[test]
    fn empty_zone_list_is_fetched_again() {
        let client = CountingClient::default();
        let mut manager = Manager::new(&client);

        assert!(manager.get_zones().unwrap().is_empty());
        assert!(manager.get_zones().unwrap().is_empty());
        assert_eq!(client.zone_fetches.get(), 2);
    }

    #[test]
    fn unknown_zone_name_is_reported() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);

        assert_eq!(manager.get_zone("example.com").unwrap().id(), "z1");
        assert!(matches!(
            manager.get_zone("example.org"),
            Err(Error::ZoneNotFound(name)) if name == "example.org"
        ));
    }

    #[test]
    fn records_are_fetched_once_per_zone_name() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com"), zone_result("z2", "example.org")],
            records: vec![record_result("r1", "www")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);
        let zones = manager.get_zones().unwrap();

        let first = manager.get_dns_records(&zones[0]).unwrap();
        let second = manager.get_dns_records(&zones[0]).unwrap();
        manager.get_dns_records(&zones[1]).unwrap();

        assert_eq!(*client.record_fetches.borrow(), vec!["z1", "z2"]);
        assert!(Rc::ptr_eq(&first[0], &second[0]));
        let record = first[0].borrow();
        assert_eq!(record.id(), Some("r1"));
        assert_eq!(record.ttl, None);
        assert_eq!(record.proxied, None);
        assert_eq!(record.zone().name(), "example.com");
    }

    #[test]
    fn empty_record_list_is_cached() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);
        let zone = manager.get_zone("example.com").unwrap();

        assert!(manager.get_dns_records(&zone).unwrap().is_empty());
        assert!(manager.get_dns_records(&zone).unwrap().is_empty());
        assert_eq!(client.record_fetches.borrow().len(), 1);
    }

    #[test]
    fn new_record_is_visible_before_flush() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com")],
            records: vec![record_result("r1", "www")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);
        let zone = manager.get_zone("example.com").unwrap();
        manager.get_dns_records(&zone).unwrap();

        let record =
            DnsRecord::new(Rc::clone(&zone), "A", "api", "5.6.7.8", None, None).into_handle();
        manager.persist_dns_record(&record);

        let records = manager.get_dns_records(&zone).unwrap();
        assert_eq!(records.len(), 2);
        assert!(Rc::ptr_eq(&records[1], &record));
        assert_eq!(manager.pending_creations().len(), 1);
        assert!(manager.pending_updates().is_empty());
    }

    #[test]
    fn staging_into_unfetched_zone_skips_remote_fetch() {
        let client = CountingClient {
            records: vec![record_result("r1", "www")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);
        let zone = Rc::new(Zone::new("z1", "example.com", "active", vec![], vec![]));

        let record =
            DnsRecord::new(Rc::clone(&zone), "A", "api", "5.6.7.8", None, None).into_handle();
        manager.persist_dns_record(&record);

        let records = manager.get_dns_records(&zone).unwrap();
        assert_eq!(records.len(), 1);
        assert!(client.record_fetches.borrow().is_empty());
    }

    #[test]
    fn staged_update_does_not_touch_cached_list() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com")],
            records: vec![record_result("r1", "www")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);
        let zone = manager.get_zone("example.com").unwrap();
        manager.get_dns_records(&zone).unwrap();

        let copy = DnsRecord::new(Rc::clone(&zone), "A", "www", "9.9.9.9", None, None)
            .with_id("r1")
            .into_handle();
        manager.persist_dns_record(&copy);

        let records = manager.get_dns_records(&zone).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].borrow().content, "1.2.3.4");
        assert_eq!(manager.pending_updates().len(), 1);
    }

    #[test]
    fn purge_cache_targets_zone_id_and_keeps_local_cache() {
        let client = CountingClient {
            zones: vec![zone_result("z1", "example.com")],
            ..Default::default()
        };
        let mut manager = Manager::new(&client);
        let zone = manager.get_zone("example.com").unwrap();

        manager.purge_cache(&zone).unwrap();
        manager.get_zones().unwrap();

        assert_eq!(*client.purged.borrow(), vec!["z1"]);
        assert_eq!(client.zone_fetches.get(), 1);
    }
}
