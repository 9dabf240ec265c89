use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a record. The read cache and the pending-creation queue hold
/// the same handle, so assigning the remote id after creation updates both.
pub type DnsRecordHandle = Rc<RefCell<DnsRecord>>;

/// A DNS zone as reported by Cloudflare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    id: String,
    name: String,
    status: String,
    name_servers: Vec<String>,
    original_name_servers: Vec<String>,
}

impl Zone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: impl Into<String>,
        name_servers: Vec<String>,
        original_name_servers: Vec<String>,
    ) -> Zone {
        Zone {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            name_servers,
            original_name_servers,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn name_servers(&self) -> &[String] {
        &self.name_servers
    }

    pub fn original_name_servers(&self) -> &[String] {
        &self.original_name_servers
    }
}

/// A DNS record inside a [`Zone`].
///
/// Equality compares every field, the zone included (by value). An empty or
/// missing id means the record does not exist remotely yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    zone: Rc<Zone>,
    id: Option<String>,
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: Option<u32>,
    pub proxied: Option<bool>,
}

impl DnsRecord {
    /// Creates a record that has not been persisted remotely.
    pub fn new(
        zone: Rc<Zone>,
        record_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        ttl: Option<u32>,
        proxied: Option<bool>,
    ) -> DnsRecord {
        DnsRecord {
            zone,
            id: None,
            record_type: record_type.into(),
            name: name.into(),
            content: content.into(),
            ttl,
            proxied,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> DnsRecord {
        self.id = Some(id.into());
        self
    }

    pub fn into_handle(self) -> DnsRecordHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn zone(&self) -> &Rc<Zone> {
        &self.zone
    }

    /// The remote id, or `None` while the record is unsaved.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    pub fn payload(&self) -> DnsRecordPayload<'_> {
        DnsRecordPayload {
            record_type: &self.record_type,
            name: &self.name,
            content: &self.content,
            ttl: self.ttl,
            proxied: self.proxied,
        }
    }
}

/// The writable fields of a record, as sent on create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DnsRecordPayload<'a> {
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
}
