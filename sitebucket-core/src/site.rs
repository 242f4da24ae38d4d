//! Point a domain at the website bucket of the same name.

use tracing::info;

use crate::contract::{ChangeInfo, DnsProvider, Endpoint, HostedZone, StorageProvider};
use crate::domain::{find_or_create_hosted_zone, upsert_alias_record};
use crate::endpoint::endpoint_for;
use crate::error::DeployError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSetup {
    pub domain: String,
    pub zone: HostedZone,
    pub endpoint: Endpoint,
    pub change: ChangeInfo,
}

/// The bucket must already exist and be named exactly like the domain, which is what
/// S3 website hosting requires for alias records to resolve.
pub async fn setup_domain<S, D>(storage: &S, dns: &D, domain: &str) -> Result<DomainSetup, DeployError>
where
    S: StorageProvider + ?Sized,
    D: DnsProvider + ?Sized,
{
    let region = storage
        .bucket_region(domain)
        .await
        .map_err(DeployError::provider("bucket_region"))?;
    let endpoint = endpoint_for(&region).ok_or_else(|| DeployError::UnknownRegion(region.clone()))?;
    info!(domain, region = %region, host = %endpoint.host, "Resolved website endpoint");

    let zone = find_or_create_hosted_zone(dns, domain).await?;
    let change = upsert_alias_record(dns, &zone, domain, &endpoint).await?;
    Ok(DomainSetup {
        domain: domain.to_string(),
        zone,
        endpoint,
        change,
    })
}
