//! # AWS providers
//!
//! Bridges the provider traits in [`sitebucket_core::contract`] to the AWS SDK:
//! [`S3Storage`] implements `StorageProvider` on `aws-sdk-s3`, [`Route53Dns`] implements
//! `DnsProvider` on `aws-sdk-route53`. [`AwsSession`] builds both from one shared SDK
//! config, so the session is created once per process and passed explicitly.
//!
//! SDK errors are converted to the service-level error type and boxed. The only error
//! interpreted here is S3's `BucketAlreadyOwnedByYou`, which becomes
//! `BucketCreation::AlreadyOwned`.

use async_trait::async_trait;
use aws_config::default_provider::region::DefaultRegionChain;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_route53 as route53;
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::primitives::ByteStream;
use s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ErrorDocument, IndexDocument,
    PublicAccessBlockConfiguration, WebsiteConfiguration,
};
use sitebucket_core::contract::{
    AliasRecord, AliasTarget, BucketCreation, ChangeInfo, DnsProvider, HostedZone,
    HostedZonePage, ObjectSummary, ObjectUpload, ProviderError, RecordSet, StorageProvider,
    WebsiteConfig,
};

use crate::load_config::AwsSection;

/// Region S3 treats as the default: buckets there take no location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

fn s3_error<E>(err: E) -> ProviderError
where
    E: Into<s3::Error>,
{
    let err: s3::Error = err.into();
    Box::new(err)
}

fn route53_error<E>(err: E) -> ProviderError
where
    E: Into<route53::Error>,
{
    let err: route53::Error = err.into();
    Box::new(err)
}

/// Configured region first, then the environment and the selected profile, then
/// [`DEFAULT_REGION`].
fn region_provider(settings: &AwsSection) -> RegionProviderChain {
    let mut environment = DefaultRegionChain::builder();
    if let Some(profile) = &settings.profile {
        environment = environment.profile_name(profile);
    }
    RegionProviderChain::first_try(settings.region.clone().map(Region::new))
        .or_else(environment.build())
        .or_else(Region::new(DEFAULT_REGION))
}

/// Clients for one AWS account/profile/region.
#[derive(Debug, Clone)]
pub struct AwsSession {
    pub storage: S3Storage,
    pub dns: Route53Dns,
}

impl AwsSession {
    pub async fn connect(settings: &AwsSection) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        loader = loader.region(region_provider(settings));
        if let Some(endpoint_url) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(ToString::to_string)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        tracing::info!(
            profile = ?settings.profile,
            region = %region,
            endpoint_url = ?settings.endpoint_url,
            "Initialised AWS session"
        );

        let mut s3_config = s3::config::Builder::from(&sdk_config);
        if settings.endpoint_url.is_some() {
            s3_config = s3_config.force_path_style(true);
        }

        AwsSession {
            storage: S3Storage {
                client: s3::Client::from_conf(s3_config.build()),
                region,
            },
            dns: Route53Dns {
                client: route53::Client::new(&sdk_config),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: s3::Client,
    region: String,
}

#[async_trait]
impl StorageProvider for S3Storage {
    async fn list_buckets(&self) -> Result<Vec<String>, ProviderError> {
        let output = self.client.list_buckets().send().await.map_err(s3_error)?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name())
            .map(str::to_string)
            .collect())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<ObjectSummary>, ProviderError> {
        let mut objects = Vec::new();
        let mut continuation_token = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(s3_error)?;
            objects.extend(output.contents().iter().filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or_default(),
                })
            }));
            if output.is_truncated() == Some(true) {
                continuation_token = output.next_continuation_token().map(ToOwned::to_owned);
            } else {
                break;
            }
        }
        Ok(objects)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<BucketCreation, ProviderError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        match request.send().await {
            Ok(_) => Ok(BucketCreation::Created),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
            {
                Ok(BucketCreation::AlreadyOwned)
            }
            Err(err) => Err(s3_error(err)),
        }
    }

    async fn allow_public_policy(&self, bucket: &str) -> Result<(), ProviderError> {
        // ACL blocks stay on; only policy-based public access is needed.
        let configuration = PublicAccessBlockConfiguration::builder()
            .block_public_acls(true)
            .ignore_public_acls(true)
            .block_public_policy(false)
            .restrict_public_buckets(false)
            .build();
        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(configuration)
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ProviderError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), ProviderError> {
        let configuration = WebsiteConfiguration::builder()
            .index_document(
                IndexDocument::builder()
                    .suffix(&website.index_document)
                    .build()?,
            )
            .error_document(
                ErrorDocument::builder()
                    .key(&website.error_document)
                    .build()?,
            )
            .build();
        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(configuration)
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    async fn put_object(&self, upload: ObjectUpload) -> Result<(), ProviderError> {
        let body = ByteStream::from_path(&upload.path).await?;
        self.client
            .put_object()
            .bucket(upload.bucket)
            .key(upload.key)
            .content_type(upload.content_type)
            .body(body)
            .send()
            .await
            .map_err(s3_error)?;
        Ok(())
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String, ProviderError> {
        let output = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(s3_error)?;
        // An empty constraint means us-east-1; "EU" is the legacy name of eu-west-1.
        let region = match output.location_constraint().map(BucketLocationConstraint::as_str) {
            None | Some("") => DEFAULT_REGION,
            Some("EU") => "eu-west-1",
            Some(other) => other,
        };
        Ok(region.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Route53Dns {
    client: route53::Client,
}

fn record_set(record: &route53::types::ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: record.name().to_string(),
        record_type: record.r#type().as_str().to_string(),
        alias_target: record.alias_target().map(|target| AliasTarget {
            hosted_zone_id: target.hosted_zone_id().to_string(),
            dns_name: target.dns_name().to_string(),
            evaluate_target_health: target.evaluate_target_health(),
        }),
    }
}

#[async_trait]
impl DnsProvider for Route53Dns {
    async fn list_hosted_zones(
        &self,
        marker: Option<String>,
    ) -> Result<HostedZonePage, ProviderError> {
        let output = self
            .client
            .list_hosted_zones()
            .set_marker(marker)
            .send()
            .await
            .map_err(route53_error)?;
        Ok(HostedZonePage {
            zones: output
                .hosted_zones()
                .iter()
                .map(|zone| HostedZone {
                    id: zone.id().to_string(),
                    name: zone.name().to_string(),
                })
                .collect(),
            // Only present when the listing is truncated.
            next_marker: output.next_marker().map(str::to_string),
        })
    }

    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &str,
    ) -> Result<HostedZone, ProviderError> {
        let output = self
            .client
            .create_hosted_zone()
            .name(name)
            .caller_reference(caller_reference)
            .send()
            .await
            .map_err(route53_error)?;
        let zone = output
            .hosted_zone()
            .ok_or("create_hosted_zone response carried no hosted zone")?;
        Ok(HostedZone {
            id: zone.id().to_string(),
            name: zone.name().to_string(),
        })
    }

    async fn list_record_sets(&self, zone_id: &str) -> Result<Vec<RecordSet>, ProviderError> {
        let mut records = Vec::new();
        let mut start: Option<(String, route53::types::RrType)> = None;
        loop {
            let mut request = self.client.list_resource_record_sets().hosted_zone_id(zone_id);
            if let Some((name, record_type)) = start.take() {
                request = request
                    .start_record_name(name)
                    .start_record_type(record_type);
            }
            let output = request.send().await.map_err(route53_error)?;
            records.extend(output.resource_record_sets().iter().map(record_set));
            match (output.next_record_name(), output.next_record_type()) {
                (Some(name), Some(record_type)) => {
                    start = Some((name.to_string(), record_type.clone()));
                }
                _ => break,
            }
        }
        Ok(records)
    }

    async fn upsert_alias_record(
        &self,
        zone_id: &str,
        record: &AliasRecord,
    ) -> Result<ChangeInfo, ProviderError> {
        use route53::types::{Change, ChangeAction, ChangeBatch, ResourceRecordSet, RrType};

        let alias_target = route53::types::AliasTarget::builder()
            .hosted_zone_id(&record.target.hosted_zone_id)
            .dns_name(&record.target.dns_name)
            .evaluate_target_health(record.target.evaluate_target_health)
            .build()?;
        let record_set = ResourceRecordSet::builder()
            .name(&record.name)
            .r#type(RrType::A)
            .alias_target(alias_target)
            .build()?;
        let change = Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()?;
        let batch = ChangeBatch::builder()
            .comment(&record.comment)
            .changes(change)
            .build()?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(route53_error)?;
        let info = output
            .change_info()
            .ok_or("change_resource_record_sets response carried no change info")?;
        Ok(ChangeInfo {
            id: info.id().to_string(),
            status: info.status().as_str().to_string(),
        })
    }
}
