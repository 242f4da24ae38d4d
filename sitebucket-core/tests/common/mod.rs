#![allow(dead_code)]
//! In-memory providers that keep state, for properties mocks cannot express
//! (idempotence, "exactly one record").

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sitebucket_core::contract::{
    AliasRecord, BucketCreation, ChangeInfo, DnsProvider, HostedZone, HostedZonePage,
    ObjectSummary, ObjectUpload, ProviderError, RecordSet, StorageProvider, WebsiteConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct InMemoryStorage {
    pub region: String,
    pub buckets: Mutex<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    pub policies: Mutex<BTreeMap<String, String>>,
    /// Buckets whose public access block has been lifted.
    pub public: Mutex<Vec<String>>,
    pub websites: Mutex<BTreeMap<String, WebsiteConfig>>,
    pub put_count: Mutex<usize>,
    /// Uploads of this key fail.
    pub fail_key: Option<String>,
}

impl InMemoryStorage {
    pub fn with_bucket(bucket: &str) -> Self {
        let storage = InMemoryStorage {
            region: "us-east-1".to_string(),
            ..Default::default()
        };
        storage
            .buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), BTreeMap::new());
        storage
    }

    pub fn objects(&self, bucket: &str) -> BTreeMap<String, StoredObject> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageProvider for InMemoryStorage {
    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.buckets.lock().unwrap().keys().cloned().collect())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, ProviderError> {
        Ok(self
            .objects(bucket)
            .into_iter()
            .map(|(key, object)| ObjectSummary {
                key,
                size: object.body.len() as i64,
            })
            .collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation, ProviderError> {
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(bucket) {
            return Ok(BucketCreation::AlreadyOwned);
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        Ok(BucketCreation::Created)
    }

    async fn allow_public_policy(&self, bucket: &str) -> Result<(), ProviderError> {
        let mut public = self.public.lock().unwrap();
        if !public.iter().any(|b| b == bucket) {
            public.push(bucket.to_string());
        }
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ProviderError> {
        if !self.public.lock().unwrap().iter().any(|b| b == bucket) {
            return Err(format!("AccessDenied: public policies are blocked on {bucket}").into());
        }
        self.policies
            .lock()
            .unwrap()
            .insert(bucket.to_string(), policy.to_string());
        Ok(())
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), ProviderError> {
        self.websites
            .lock()
            .unwrap()
            .insert(bucket.to_string(), website.clone());
        Ok(())
    }

    async fn put_object(&self, upload: ObjectUpload) -> Result<(), ProviderError> {
        if self.fail_key.as_deref() == Some(upload.key.as_str()) {
            return Err(format!("AccessDenied: {}", upload.key).into());
        }
        let body = tokio::fs::read(&upload.path).await?;
        *self.put_count.lock().unwrap() += 1;
        let mut buckets = self.buckets.lock().unwrap();
        let bucket = buckets
            .get_mut(&upload.bucket)
            .ok_or_else(|| format!("NoSuchBucket: {}", upload.bucket))?;
        bucket.insert(
            upload.key,
            StoredObject {
                content_type: upload.content_type,
                body,
            },
        );
        Ok(())
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String, ProviderError> {
        if self.buckets.lock().unwrap().contains_key(bucket) {
            Ok(self.region.clone())
        } else {
            Err(format!("NoSuchBucket: {bucket}").into())
        }
    }
}

/// Record sets keyed by `(name, type)`, so an UPSERT replaces in place.
#[derive(Default)]
pub struct InMemoryDns {
    pub zones: Mutex<Vec<HostedZone>>,
    pub records: Mutex<BTreeMap<(String, String), (String, RecordSet)>>,
    pub page_size: usize,
}

impl InMemoryDns {
    pub fn with_zones(names: &[&str]) -> Self {
        let zones = names
            .iter()
            .enumerate()
            .map(|(i, name)| HostedZone {
                id: format!("/hostedzone/Z{i}"),
                name: name.to_string(),
            })
            .collect();
        InMemoryDns {
            zones: Mutex::new(zones),
            page_size: 2,
            ..Default::default()
        }
    }
}

#[async_trait]
impl DnsProvider for InMemoryDns {
    async fn list_hosted_zones(
        &self,
        marker: Option<String>,
    ) -> Result<HostedZonePage, ProviderError> {
        let zones = self.zones.lock().unwrap();
        let start: usize = match marker {
            Some(m) => m.parse()?,
            None => 0,
        };
        let end = (start + self.page_size.max(1)).min(zones.len());
        Ok(HostedZonePage {
            zones: zones[start..end].to_vec(),
            next_marker: (end < zones.len()).then(|| end.to_string()),
        })
    }

    async fn create_hosted_zone(
        &self,
        name: &str,
        _caller_reference: &str,
    ) -> Result<HostedZone, ProviderError> {
        let mut zones = self.zones.lock().unwrap();
        let zone = HostedZone {
            id: format!("/hostedzone/Z{}", zones.len()),
            name: name.to_string(),
        };
        zones.push(zone.clone());
        Ok(zone)
    }

    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<RecordSet>, ProviderError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|(zone, _)| zone == zone_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert_alias_record(
        &self,
        zone_id: &str,
        record: &AliasRecord,
    ) -> Result<ChangeInfo, ProviderError> {
        let mut records = self.records.lock().unwrap();
        let key = (record.name.clone(), "A".to_string());
        records.insert(
            key,
            (
                zone_id.to_string(),
                RecordSet {
                    name: record.name.clone(),
                    record_type: "A".to_string(),
                    alias_target: Some(record.target.clone()),
                },
            ),
        );
        Ok(ChangeInfo {
            id: format!("/change/C{}", records.len()),
            status: "PENDING".to_string(),
        })
    }
}
