//! S3 static website endpoints per region.
//!
//! Alias records for a bucket website point at the regional website endpoint, so both
//! the hostname and the endpoint's own hosted zone id are needed.

use crate::contract::Endpoint;

/// `(region, website host, hosted zone id)`
const WEBSITE_ENDPOINTS: &[(&str, &str, &str)] = &[
    ("us-east-1", "s3-website-us-east-1.amazonaws.com", "Z3AQBSTGFYJSTF"),
    ("us-east-2", "s3-website.us-east-2.amazonaws.com", "Z2O1EMRO9K5GLX"),
    ("us-west-1", "s3-website-us-west-1.amazonaws.com", "Z2F56UZL2M1ACD"),
    ("us-west-2", "s3-website-us-west-2.amazonaws.com", "Z3BJ6K6RIION7M"),
    ("ca-central-1", "s3-website.ca-central-1.amazonaws.com", "Z1QDHH18159H29"),
    ("ap-south-1", "s3-website.ap-south-1.amazonaws.com", "Z11RGJOFQNVJUP"),
    ("ap-northeast-1", "s3-website-ap-northeast-1.amazonaws.com", "Z2M4EHUR26P7ZW"),
    ("ap-northeast-2", "s3-website.ap-northeast-2.amazonaws.com", "Z3W03O7B5YMIYP"),
    ("ap-southeast-1", "s3-website-ap-southeast-1.amazonaws.com", "Z3O0J2DXBE1FTB"),
    ("ap-southeast-2", "s3-website-ap-southeast-2.amazonaws.com", "Z1WCIGYICN2BYD"),
    ("eu-central-1", "s3-website.eu-central-1.amazonaws.com", "Z21DNDUVLTQW6Q"),
    ("eu-west-1", "s3-website-eu-west-1.amazonaws.com", "Z1BKCTXD74EZPE"),
    ("eu-west-2", "s3-website.eu-west-2.amazonaws.com", "Z3GKZC51ZF0DB4"),
    ("eu-west-3", "s3-website.eu-west-3.amazonaws.com", "Z3R1K369G5AVDG"),
    ("sa-east-1", "s3-website-sa-east-1.amazonaws.com", "Z7KQH4QJS55SO"),
];

/// Website endpoint for `region`, if the region hosts S3 websites.
pub fn endpoint_for(region: &str) -> Option<Endpoint> {
    WEBSITE_ENDPOINTS
        .iter()
        .find(|(name, _, _)| *name == region)
        .map(|(name, host, zone)| Endpoint {
            name: name.to_string(),
            host: host.to_string(),
            zone: zone.to_string(),
        })
}

pub fn is_known_region(region: &str) -> bool {
    WEBSITE_ENDPOINTS.iter().any(|(name, _, _)| *name == region)
}
