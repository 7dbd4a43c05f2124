//! Partition derivation from regions and caller ARNs.

/// Partition used when a region matches no special prefix.
pub const STANDARD_PARTITION: &str = "aws";

/// Region-prefix to partition table. The `us-isob-` entry must stay ahead of
/// `us-iso-`, which is a prefix of it.
const REGION_PARTITIONS: &[(&str, &str)] = &[
    ("cn-", "aws-cn"),
    ("us-gov-", "aws-us-gov"),
    ("us-isob-", "aws-iso-b"),
    ("us-iso-", "aws-iso"),
];

/// Derive the endpoint partition for a region name.
#[must_use]
pub fn partition_for_region(region: &str) -> &'static str {
    for &(prefix, partition) in REGION_PARTITIONS {
        if region.starts_with(prefix) {
            return partition;
        }
    }
    STANDARD_PARTITION
}

/// Extract the partition segment from an ARN (`arn:partition:service:...`).
#[must_use]
pub fn partition_from_arn(arn: &str) -> Option<String> {
    let mut parts = arn.splitn(3, ':');
    if parts.next() != Some("arn") {
        return None;
    }
    match (parts.next(), parts.next()) {
        (Some(partition), Some(_rest)) if !partition.is_empty() => Some(partition.to_string()),
        _ => None,
    }
}
