use crate::error::{ApiMessage, Error, Result};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::from_str;

mod cache;
pub mod client;
pub mod manager;
pub mod model;

pub use client::{Client, DnsRecordResult, ZoneResult};
pub use manager::Manager;
pub use model::{DnsRecord, DnsRecordHandle, DnsRecordPayload, Zone};

pub static API_URL: &str = "https://api.cloudflare.com/client/v4";

const ZONES_PER_PAGE: u32 = 50;
const DNS_RECORDS_PER_PAGE: u32 = 100;

#[derive(Deserialize)]
struct CloudflareApiResponse<V> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<V>,
    result_info: Option<ResultInfo>,
}

#[derive(Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Deserialize)]
struct CreatedRecord {
    id: String,
}

#[derive(Serialize)]
struct PurgeRequest {
    purge_everything: bool,
}

/// [`Client`] backed by the Cloudflare v4 REST API.
pub struct CloudflareApi {
    token: String,
    api_url: String,
    client: HttpClient,
}

impl CloudflareApi {
    pub fn new(token: String) -> CloudflareApi {
        CloudflareApi::with_api_url(token, API_URL.to_string())
    }

    pub fn with_api_url(token: String, api_url: String) -> CloudflareApi {
        CloudflareApi {
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            client: HttpClient::new(),
        }
    }

    fn fetch_all_pages<V: for<'a> Deserialize<'a>>(
        &self,
        path: &str,
        per_page: u32,
    ) -> Result<Vec<V>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let page_path = format!("{}?page={}&per_page={}", path, page, per_page);
            let response: CloudflareApiResponse<Vec<V>> =
                self.send(Method::GET, &page_path, |request| request)?;
            let next = next_page(page, response.result_info.as_ref());
            items.extend(response.result.unwrap_or_default());

            match next {
                Some(next) => page = next,
                None => return Ok(items),
            }
        }
    }

    fn request<V, B>(&self, method: Method, path: &str, body: &B) -> Result<V>
    where
        V: for<'a> Deserialize<'a>,
        B: Serialize + ?Sized,
    {
        let response: CloudflareApiResponse<V> =
            self.send(method.clone(), path, |request| request.json(body))?;
        response.result.ok_or_else(|| Error::MissingResult {
            method: method.to_string(),
            path: path.to_string(),
        })
    }

    fn send<V: for<'a> Deserialize<'a>>(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<CloudflareApiResponse<V>> {
        let url = format!("{}/{}", self.api_url, path);
        log::debug!("{} {}", method, url);

        let request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&self.token);
        let response = build(request).send()?;
        log::debug!("Response Status: {}", response.status());

        let body = response.text()?;
        decode_response(method.as_str(), path, &body)
    }
}

impl Client for CloudflareApi {
    fn get_zones(&self) -> Result<Vec<ZoneResult>> {
        self.fetch_all_pages("zones", ZONES_PER_PAGE)
    }

    fn get_dns_records(&self, zone_id: &str) -> Result<Vec<DnsRecordResult>> {
        self.fetch_all_pages(
            &format!("zones/{}/dns_records", zone_id),
            DNS_RECORDS_PER_PAGE,
        )
    }

    fn add_dns_record(&self, zone_id: &str, record: &DnsRecordPayload<'_>) -> Result<String> {
        let created: CreatedRecord = self.request(
            Method::POST,
            &format!("zones/{}/dns_records", zone_id),
            record,
        )?;
        Ok(created.id)
    }

    fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecordPayload<'_>,
    ) -> Result<()> {
        let _: serde_json::Value = self.request(
            Method::PUT,
            &format!("zones/{}/dns_records/{}", zone_id, record_id),
            record,
        )?;
        Ok(())
    }

    fn purge_cache(&self, zone_id: &str) -> Result<()> {
        let _: serde_json::Value = self.request(
            Method::POST,
            &format!("zones/{}/purge_cache", zone_id),
            &PurgeRequest {
                purge_everything: true,
            },
        )?;
        Ok(())
    }
}

/// The page to request after `page`, or `None` once the last page was read.
/// Responses without pagination info count as a single page.
fn next_page(page: u32, result_info: Option<&ResultInfo>) -> Option<u32> {
    let total_pages = result_info.and_then(|info| info.total_pages).unwrap_or(1);
    (page < total_pages).then_some(page + 1)
}

fn decode_response<V: for<'a> Deserialize<'a>>(
    method: &str,
    path: &str,
    body: &str,
) -> Result<CloudflareApiResponse<V>> {
    let response: CloudflareApiResponse<V> = from_str(body).map_err(|e| {
        log::error!("Unable to parse response to {} {}: {}", method, path, body);
        e
    })?;

    if !response.success {
        log::error!("Cloudflare API rejected {} {}", method, path);
        return Err(Error::Api {
            method: method.to_string(),
            path: path.to_string(),
            errors: response.errors,
        });
    }
    Ok(response)
}
