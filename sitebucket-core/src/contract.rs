//! # contract: provider interfaces for storage and DNS
//!
//! This module defines the two traits the deployment logic talks to
//! ([`StorageProvider`] and [`DnsProvider`]) and the plain data types that cross them.
//!
//! ## Interface & Extensibility
//! - Implement the traits to reach a new backend (the CLI crate implements them on top of
//!   the AWS SDK; tests implement them in memory).
//! - All methods are async and return [`ProviderError`], a boxed error. Implementors pass
//!   upstream failures through without reinterpreting them, with one exception:
//!   [`StorageProvider::create_bucket`] reports "already owned by you" as
//!   [`BucketCreation::AlreadyOwned`] instead of an error.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; the mocks are exported behind the
//!   `test-export-mocks` feature so integration tests can use them.

use std::path::PathBuf;

use async_trait::async_trait;
use mockall::automock;

/// Error returned by provider implementations.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a bucket creation attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    /// The bucket did not exist and was created by this call.
    Created,
    /// The bucket already existed and belongs to the caller.
    AlreadyOwned,
}

/// Static website settings applied to a bucket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    /// Suffix served for directory requests, e.g. `index.html`.
    pub index_document: String,
    /// Key served on 4xx errors, e.g. `error.html`.
    pub error_document: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        WebsiteConfig {
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
        }
    }
}

/// A single object upload. The body is streamed from `path` by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUpload {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub path: PathBuf,
}

/// An object as returned by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
}

/// A DNS hosted zone. `name` carries the trailing dot, as Route 53 returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

/// One page of a hosted zone listing.
#[derive(Debug, Clone, Default)]
pub struct HostedZonePage {
    pub zones: Vec<HostedZone>,
    /// Marker for the next page, `None` on the last page.
    pub next_marker: Option<String>,
}

/// A hosting endpoint an alias record can point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Region the endpoint serves.
    pub name: String,
    /// Hostname of the endpoint, e.g. `s3-website-us-east-1.amazonaws.com`.
    pub host: String,
    /// Hosted zone id of the endpoint itself.
    pub zone: String,
}

/// Target of an alias record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    pub evaluate_target_health: bool,
}

/// An `A` alias record to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    pub name: String,
    pub target: AliasTarget,
    pub comment: String,
}

/// A record set as returned by a zone listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub name: String,
    pub record_type: String,
    pub alias_target: Option<AliasTarget>,
}

/// Acknowledgement of a submitted change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    pub status: String,
}

/// Object storage operations needed to host a static site.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Names of all buckets visible to the caller.
    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError>;

    /// Every object in the bucket, across all pages.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, ProviderError>;

    /// Create the bucket. "Already owned by you" is `Ok(BucketCreation::AlreadyOwned)`.
    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation, ProviderError>;

    /// Lift the account-default block on public bucket policies for this bucket.
    async fn allow_public_policy(&self, bucket: &str) -> Result<(), ProviderError>;

    /// Replace the bucket policy with the given JSON document.
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ProviderError>;

    /// Replace the static website configuration of the bucket.
    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), ProviderError>;

    /// Upload one object, overwriting any object already stored under the key.
    async fn put_object(&self, upload: ObjectUpload) -> Result<(), ProviderError>;

    /// Region the bucket lives in, e.g. `us-east-1`.
    async fn bucket_region(&self, bucket: &str) -> Result<String, ProviderError>;
}

/// DNS operations needed to point a domain at a hosting endpoint.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// One page of hosted zones, starting at `marker` (or the beginning when `None`).
    async fn list_hosted_zones(
        &self,
        marker: Option<String>,
    ) -> Result<HostedZonePage, ProviderError>;

    /// Create a hosted zone. `caller_reference` makes retried requests idempotent.
    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<HostedZone, ProviderError>;

    /// Every record set in the zone.
    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<RecordSet>, ProviderError>;

    /// Submit an UPSERT for the alias record.
    async fn upsert_alias_record(
        &self,
        zone_id: &str,
        record: &AliasRecord,
    ) -> Result<ChangeInfo, ProviderError>;
}
