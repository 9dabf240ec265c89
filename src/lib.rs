//! Cached, batching access to the Cloudflare DNS management API.
//!
//! [`Manager`] sits in front of a [`Client`]: zones and records are fetched once
//! and served from memory afterwards, record writes are staged with
//! [`Manager::persist_dns_record`] and sent together by [`Manager::flush`].

pub mod changes;
pub mod cloudflare;
pub mod config;
pub mod error;

pub use cloudflare::{
    Client, CloudflareApi, DnsRecord, DnsRecordHandle, DnsRecordPayload, DnsRecordResult,
    Manager, Zone, ZoneResult,
};
pub use config::Config;
pub use error::{Error, Result};
