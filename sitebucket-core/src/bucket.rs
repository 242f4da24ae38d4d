//! Bucket provisioning: create or adopt a bucket, open it for public reads and turn on
//! static website hosting.
//!
//! Every step here is idempotent, so `setup_bucket` can be re-run against a bucket
//! that is already configured.

use serde_json::json;
use tracing::{error, info};

use crate::contract::{BucketCreation, ObjectSummary, StorageProvider, WebsiteConfig};
use crate::endpoint::endpoint_for;
use crate::error::DeployError;

/// Result of a full bucket setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSetup {
    pub bucket: String,
    pub creation: BucketCreation,
}

pub async fn list_buckets<S>(storage: &S) -> Result<Vec<String>, DeployError>
where
    S: StorageProvider + ?Sized,
{
    let buckets = storage
        .list_buckets()
        .await
        .map_err(DeployError::provider("list_buckets"))?;
    info!(count = buckets.len(), "Listed buckets");
    Ok(buckets)
}

pub async fn list_objects<S>(storage: &S, bucket: &str) -> Result<Vec<ObjectSummary>, DeployError>
where
    S: StorageProvider + ?Sized,
{
    let objects = storage
        .list_objects(bucket)
        .await
        .map_err(DeployError::provider("list_objects"))?;
    info!(bucket, count = objects.len(), "Listed bucket objects");
    Ok(objects)
}

/// Create the bucket, or adopt it when the caller already owns it.
pub async fn ensure_bucket<S>(storage: &S, bucket: &str) -> Result<BucketCreation, DeployError>
where
    S: StorageProvider + ?Sized,
{
    info!(bucket, "Ensuring bucket exists");
    match storage.create_bucket(bucket).await {
        Ok(BucketCreation::Created) => {
            info!(bucket, "Created bucket");
            Ok(BucketCreation::Created)
        }
        Ok(BucketCreation::AlreadyOwned) => {
            info!(bucket, "Bucket already owned by caller, reusing it");
            Ok(BucketCreation::AlreadyOwned)
        }
        Err(e) => {
            error!(bucket, error = ?e, "Bucket creation failed");
            Err(DeployError::provider("create_bucket")(e))
        }
    }
}

/// Policy document granting anonymous `s3:GetObject` on every object in the bucket.
pub fn public_read_policy(bucket: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{bucket}/*")]
        }]
    })
    .to_string()
}

/// New buckets block public policies by default; lift that before `set_policy`.
pub async fn allow_public_access<S>(storage: &S, bucket: &str) -> Result<(), DeployError>
where
    S: StorageProvider + ?Sized,
{
    storage.allow_public_policy(bucket).await.map_err(|e| {
        error!(bucket, error = ?e, "Failed to lift public access block");
        DeployError::provider("allow_public_policy")(e)
    })?;
    info!(bucket, "Lifted public access block");
    Ok(())
}

pub async fn set_policy<S>(storage: &S, bucket: &str) -> Result<(), DeployError>
where
    S: StorageProvider + ?Sized,
{
    let policy = public_read_policy(bucket);
    storage
        .put_bucket_policy(bucket, &policy)
        .await
        .map_err(|e| {
            error!(bucket, error = ?e, "Failed to apply public-read policy");
            DeployError::provider("put_bucket_policy")(e)
        })?;
    info!(bucket, "Applied public-read policy");
    Ok(())
}

pub async fn configure_website<S>(
    storage: &S,
    bucket: &str,
    website: &WebsiteConfig,
) -> Result<(), DeployError>
where
    S: StorageProvider + ?Sized,
{
    storage
        .put_bucket_website(bucket, website)
        .await
        .map_err(|e| {
            error!(bucket, error = ?e, "Failed to configure website hosting");
            DeployError::provider("put_bucket_website")(e)
        })?;
    info!(
        bucket,
        index = %website.index_document,
        error_document = %website.error_document,
        "Configured website hosting"
    );
    Ok(())
}

/// Ensure the bucket exists, open it to public policies, then apply the public-read
/// policy and website config.
pub async fn setup_bucket<S>(
    storage: &S,
    bucket: &str,
    website: &WebsiteConfig,
) -> Result<BucketSetup, DeployError>
where
    S: StorageProvider + ?Sized,
{
    let creation = ensure_bucket(storage, bucket).await?;
    allow_public_access(storage, bucket).await?;
    set_policy(storage, bucket).await?;
    configure_website(storage, bucket, website).await?;
    Ok(BucketSetup {
        bucket: bucket.to_string(),
        creation,
    })
}

/// Public website URL of the bucket, derived from its region.
pub async fn bucket_url<S>(storage: &S, bucket: &str) -> Result<String, DeployError>
where
    S: StorageProvider + ?Sized,
{
    let region = storage
        .bucket_region(bucket)
        .await
        .map_err(DeployError::provider("bucket_region"))?;
    let endpoint = endpoint_for(&region).ok_or_else(|| DeployError::UnknownRegion(region))?;
    Ok(format!("http://{bucket}.{}", endpoint.host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_targets_every_object_in_bucket() {
        let policy: serde_json::Value =
            serde_json::from_str(&public_read_policy("my-site")).expect("policy is JSON");
        let statement = &policy["Statement"][0];
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"], "*");
        assert_eq!(statement["Action"][0], "s3:GetObject");
        assert_eq!(statement["Resource"][0], "arn:aws:s3:::my-site/*");
    }
}
