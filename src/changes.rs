use crate::cloudflare::{Client, DnsRecord, Manager};
use crate::error::Result;
use serde::Deserialize;

/// One desired record state, as given on the command line or in an `apply` file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordChange {
    pub zone: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Stages `change` as an update of the matching record (same type and name,
/// compared case-insensitively) or as a new record when the zone has none.
///
/// Nothing is sent until the manager is flushed.
pub fn stage_change<C: Client + ?Sized>(
    manager: &mut Manager<'_, C>,
    change: &RecordChange,
) -> Result<ChangeOutcome> {
    let zone = manager.get_zone(&change.zone)?;
    let name = qualify_name(&change.name, zone.name());

    let existing = manager.get_dns_records(&zone)?.into_iter().find(|record| {
        let record = record.borrow();
        record.record_type.eq_ignore_ascii_case(&change.record_type)
            && record.name.eq_ignore_ascii_case(&name)
    });

    let record = match existing {
        Some(record) => record,
        None => {
            log::info!("{}: {} {} (new)", zone.name(), change.record_type, name);
            let record = DnsRecord::new(
                zone,
                change.record_type.to_ascii_uppercase(),
                name,
                change.content.as_str(),
                change.ttl,
                change.proxied,
            )
            .into_handle();
            manager.persist_dns_record(&record);
            return Ok(ChangeOutcome::Created);
        }
    };

    {
        let mut current = record.borrow_mut();
        let unchanged = current.content == change.content
            && change.ttl.map_or(true, |ttl| current.ttl == Some(ttl))
            && change
                .proxied
                .map_or(true, |proxied| current.proxied == Some(proxied));
        if unchanged {
            return Ok(ChangeOutcome::Unchanged);
        }

        log::info!(
            "{}: {} {} {} -> {}",
            zone.name(),
            current.record_type,
            current.name,
            current.content,
            change.content
        );
        current.content = change.content.clone();
        current.ttl = change.ttl.or(current.ttl);
        current.proxied = change.proxied.or(current.proxied);

        // Still waiting for creation, the queued handle already carries the edit.
        if !current.is_persisted() {
            return Ok(ChangeOutcome::Updated);
        }
    }

    manager.persist_dns_record(&record);
    Ok(ChangeOutcome::Updated)
}

/// Turns a relative name (`www`, `@`) into the lowercase fully qualified name
/// Cloudflare reports. Names already ending in the zone are kept.
pub fn qualify_name(name: &str, zone_name: &str) -> String {
    let name = name.trim_end_matches('.').to_ascii_lowercase();
    let zone_name = zone_name.to_ascii_lowercase();

    if name == "@" || name.is_empty() || name == zone_name {
        zone_name
    } else if name.ends_with(&format!(".{}", zone_name)) {
        name
    } else {
        format!("{}.{}", name, zone_name)
    }
}
