///
/// This module implements the CLI interface for sitebucket: command parsing, argument
/// validation and the user-visible output of every subcommand.
///
/// All deployment logic (provisioning, sync, DNS) lives in the [`sitebucket-core`] crate.
/// This module is strictly CLI glue: it loads configuration, builds the AWS session once
/// and hands it to the core operations.
///
/// ## How To Use
/// - For command-line users: use the installed `sitebucket` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`sitebucket-core`]: ../../sitebucket-core/
use crate::aws::AwsSession;
use crate::load_config::load_optional_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use sitebucket_core::bucket::{bucket_url, list_buckets, list_objects, setup_bucket};
use sitebucket_core::contract::BucketCreation;
use sitebucket_core::domain::list_record_sets;
use sitebucket_core::endpoint::is_known_region;
use sitebucket_core::site::setup_domain;
use sitebucket_core::synchronise::{resolve_root, sync_directory};
use std::path::PathBuf;

/// CLI for sitebucket: deploy static websites to S3 and Route 53.
#[derive(Debug, Parser)]
#[clap(
    name = "sitebucket",
    version,
    about = "Deploy static websites to S3 buckets and point domains at them with Route 53"
)]
pub struct Cli {
    /// Path to an optional YAML config file
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// AWS profile to use (overrides the config file)
    #[clap(long, global = true)]
    pub profile: Option<String>,

    /// AWS region to use (overrides the config file)
    #[clap(long, global = true)]
    pub region: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all S3 buckets
    ListBuckets,
    /// List the objects in a bucket
    ListBucketObjects {
        bucket: String,
    },
    /// Create a bucket (or adopt one you own) and configure it for website hosting
    SetupBucket {
        bucket: String,
    },
    /// Sync the contents of PATHNAME to BUCKET
    Sync {
        pathname: PathBuf,
        bucket: String,
    },
    /// Point DOMAIN at the website bucket of the same name
    SetupDomain {
        domain: String,
    },
    /// List the DNS records of the hosted zone serving DOMAIN
    ListRecords {
        domain: String,
    },
}

fn describe_creation(creation: BucketCreation) -> &'static str {
    match creation {
        BucketCreation::Created => "created",
        BucketCreation::AlreadyOwned => "already owned, reused",
    }
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let mut config = load_optional_config(cli.config.as_deref())?;
    if let Some(profile) = cli.profile {
        config.aws.profile = Some(profile);
    }
    if let Some(region) = cli.region {
        config.aws.region = Some(region);
    }
    let deploy = config.deploy();
    if let Some(region) = config.aws.region.as_deref().filter(|r| !is_known_region(r)) {
        tracing::warn!(region, "Region has no known S3 website endpoint; website URLs and domain setup will fail");
    }

    // Local arguments are checked before any AWS call is made.
    let sync_root = match &cli.command {
        Commands::Sync { pathname, .. } => Some(resolve_root(pathname)?),
        _ => None,
    };

    let session = AwsSession::connect(&config.aws).await;

    match cli.command {
        Commands::ListBuckets => {
            for bucket in list_buckets(&session.storage).await? {
                println!("{bucket}");
            }
        }
        Commands::ListBucketObjects { bucket } => {
            for object in list_objects(&session.storage, &bucket).await? {
                println!("{}", object.key);
            }
        }
        Commands::SetupBucket { bucket } => {
            tracing::info!(command = "setup-bucket", bucket = %bucket, "Setting up bucket");
            let setup = setup_bucket(&session.storage, &bucket, &deploy.website).await?;
            println!("Bucket {} {}", setup.bucket, describe_creation(setup.creation));
            match bucket_url(&session.storage, &bucket).await {
                Ok(url) => println!("Website URL: {url}"),
                Err(e) => tracing::warn!(bucket = %bucket, error = %e, "Could not derive website URL"),
            }
        }
        Commands::Sync { pathname, bucket } => {
            let root = sync_root.unwrap_or(pathname);
            tracing::info!(command = "sync", root = %root.display(), bucket = %bucket, "Starting synchronisation");
            match sync_directory(&session.storage, &root, &bucket, &deploy.sync).await {
                Ok(report) => {
                    for object in &report.uploaded {
                        println!("{}: {}", object.key, object.content_type);
                    }
                    println!(
                        "Synced {} files from {} to {}",
                        report.uploaded.len(),
                        report.root.display(),
                        report.bucket
                    );
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    return Err(e.into());
                }
            }
        }
        Commands::SetupDomain { domain } => {
            tracing::info!(command = "setup-domain", domain = %domain, "Setting up domain");
            let setup = setup_domain(&session.storage, &session.dns, &domain).await?;
            println!(
                "{} -> {} (zone {} {}, change {} {})",
                setup.domain,
                setup.endpoint.host,
                setup.zone.name,
                setup.zone.id,
                setup.change.id,
                setup.change.status
            );
        }
        Commands::ListRecords { domain } => {
            for record in list_record_sets(&session.dns, &domain).await? {
                let target = record
                    .alias_target
                    .map(|alias| alias.dns_name)
                    .unwrap_or_default();
                println!("{}\t{}\t{}", record.name, record.record_type, target);
            }
        }
    }

    Ok(())
}
