//! Hosted zone lookup and alias records.
//!
//! A domain such as `blog.example.com` is served from the hosted zone whose name is
//! the most specific suffix of it (`example.com.` or `blog.example.com.`). When no
//! zone matches, one is created for the registrable part of the domain.

use tracing::{error, info};
use uuid::Uuid;

use crate::contract::{
    AliasRecord, AliasTarget, ChangeInfo, DnsProvider, Endpoint, HostedZone, RecordSet,
};
use crate::error::DeployError;

/// Comment attached to every change batch this tool submits.
pub const CHANGE_COMMENT: &str = "Record set created by sitebucket";

fn normalise(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Whether `zone_name` is `domain` itself or one of its parent domains.
pub fn zone_matches(zone_name: &str, domain: &str) -> bool {
    let zone = normalise(zone_name);
    let domain = normalise(domain);
    if zone.is_empty() {
        return false;
    }
    domain == zone || domain.ends_with(&format!(".{zone}"))
}

/// Find the hosted zone for `domain`, walking every page of the zone listing.
///
/// When several zones match, the longest name wins; ties keep the first one listed.
pub async fn find_hosted_zone<D>(dns: &D, domain: &str) -> Result<Option<HostedZone>, DeployError>
where
    D: DnsProvider + ?Sized,
{
    let mut best: Option<HostedZone> = None;
    let mut marker = None;
    loop {
        let page = dns
            .list_hosted_zones(marker)
            .await
            .map_err(|e| {
                error!(domain, error = ?e, "Failed to list hosted zones");
                DeployError::provider("list_hosted_zones")(e)
            })?;
        for zone in page.zones {
            if !zone_matches(&zone.name, domain) {
                continue;
            }
            let longer = best
                .as_ref()
                .map_or(true, |current| normalise(&zone.name).len() > normalise(&current.name).len());
            if longer {
                best = Some(zone);
            }
        }
        match page.next_marker {
            Some(next) => marker = Some(next),
            None => break,
        }
    }
    match &best {
        Some(zone) => info!(domain, zone_id = %zone.id, zone_name = %zone.name, "Found hosted zone"),
        None => info!(domain, "No hosted zone matches domain"),
    }
    Ok(best)
}

/// Zone name for a domain with no existing zone: its last two labels plus the root dot.
pub fn zone_name_for(domain: &str) -> Result<String, DeployError> {
    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(DeployError::InvalidDomain(domain.to_string()));
    }
    Ok(format!("{}.", labels[labels.len() - 2..].join(".")))
}

pub async fn create_hosted_zone<D>(dns: &D, domain: &str) -> Result<HostedZone, DeployError>
where
    D: DnsProvider + ?Sized,
{
    let zone_name = zone_name_for(domain)?;
    let caller_reference = Uuid::new_v4().to_string();
    info!(domain, zone_name = %zone_name, caller_reference = %caller_reference, "Creating hosted zone");
    let zone = dns
        .create_hosted_zone(&zone_name, &caller_reference)
        .await
        .map_err(|e| {
            error!(zone_name = %zone_name, error = ?e, "Failed to create hosted zone");
            DeployError::provider("create_hosted_zone")(e)
        })?;
    info!(zone_id = %zone.id, zone_name = %zone.name, "Created hosted zone");
    Ok(zone)
}

pub async fn find_or_create_hosted_zone<D>(dns: &D, domain: &str) -> Result<HostedZone, DeployError>
where
    D: DnsProvider + ?Sized,
{
    match find_hosted_zone(dns, domain).await? {
        Some(zone) => Ok(zone),
        None => create_hosted_zone(dns, domain).await,
    }
}

/// UPSERT an `A` alias record pointing `domain` at `endpoint`.
pub async fn upsert_alias_record<D>(
    dns: &D,
    zone: &HostedZone,
    domain: &str,
    endpoint: &Endpoint,
) -> Result<ChangeInfo, DeployError>
where
    D: DnsProvider + ?Sized,
{
    let record = AliasRecord {
        name: domain.to_string(),
        target: AliasTarget {
            hosted_zone_id: endpoint.zone.clone(),
            dns_name: endpoint.host.clone(),
            evaluate_target_health: false,
        },
        comment: CHANGE_COMMENT.to_string(),
    };
    info!(zone_id = %zone.id, domain, target = %endpoint.host, "Upserting alias record");
    let change = dns
        .upsert_alias_record(&zone.id, &record)
        .await
        .map_err(|e| {
            error!(zone_id = %zone.id, domain, error = ?e, "Alias record upsert failed");
            DeployError::provider("change_resource_record_sets")(e)
        })?;
    info!(change_id = %change.id, status = %change.status, "Alias record change submitted");
    Ok(change)
}

/// Every record set in the zone that serves `domain`.
pub async fn list_record_sets<D>(dns: &D, domain: &str) -> Result<Vec<RecordSet>, DeployError>
where
    D: DnsProvider + ?Sized,
{
    let zone = find_hosted_zone(dns, domain)
        .await?
        .ok_or_else(|| DeployError::ZoneNotFound(domain.to_string()))?;
    let records = dns
        .list_record_sets(&zone.id)
        .await
        .map_err(DeployError::provider("list_resource_record_sets"))?;
    info!(zone_id = %zone.id, count = records.len(), "Listed record sets");
    Ok(records)
}
