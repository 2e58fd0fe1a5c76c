//! # AWS Identifier Validation
//!
//! Region codes and Secrets Manager ARNs end up verbatim in boot scripts, so
//! they are checked against the official formats first.

use anyhow::Result;
use regex::Regex;

/// Validate AWS region against official AWS region format
/// Supports standard regions (us-east-1) and special regions (us-gov-west-1, cn-north-1)
/// Reference: https://docs.aws.amazon.com/general/latest/gr/rande.html
pub fn validate_aws_region(region: &str) -> Result<()> {
    let region_trimmed = region.trim().to_lowercase();

    if region_trimmed.is_empty() {
        return Err(anyhow::anyhow!("region cannot be empty"));
    }

    // Standard: us-east-1, Gov: us-gov-west-1, ISO: us-iso-east-1, China: cn-north-1
    let standard_pattern = Regex::new(r"^[a-z]{2}-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;
    let gov_pattern = Regex::new(r"^[a-z]{2}-gov-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;
    let iso_pattern = Regex::new(r"^[a-z]{2}-iso[bef]?-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;
    let china_pattern = Regex::new(r"^cn-[a-z]+-\d+$")
        .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    if standard_pattern.is_match(&region_trimmed)
        || gov_pattern.is_match(&region_trimmed)
        || iso_pattern.is_match(&region_trimmed)
        || china_pattern.is_match(&region_trimmed)
    {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "region '{region}' must be a valid AWS region code (e.g., 'us-east-1', 'eu-west-1', 'us-gov-west-1', 'cn-north-1'). See: https://docs.aws.amazon.com/general/latest/gr/rande.html"
        ))
    }
}

/// Components of a Secrets Manager ARN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSecretArn<'a> {
    pub partition: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub name: &'a str,
}

/// Parse `arn:<partition>:secretsmanager:<region>:<account>:secret:<name>`
pub fn parse_secret_arn(arn: &str) -> Result<ParsedSecretArn<'_>> {
    let arn_regex = Regex::new(
        r"^arn:(aws|aws-cn|aws-us-gov|aws-iso|aws-iso-b):secretsmanager:([a-z0-9-]+):(\d{12}|\d+):secret:([A-Za-z0-9/_+=.@-]+)$",
    )
    .map_err(|e| anyhow::anyhow!("Failed to compile regex: {e}"))?;

    let captures = arn_regex.captures(arn).ok_or_else(|| {
        anyhow::anyhow!(
            "'{arn}' is not a Secrets Manager ARN (expected arn:<partition>:secretsmanager:<region>:<account>:secret:<name>)"
        )
    })?;

    // All groups are mandatory in the pattern
    let group = |i: usize| captures.get(i).map_or("", |m| m.as_str());
    Ok(ParsedSecretArn {
        partition: group(1),
        region: group(2),
        account: group(3),
        name: group(4),
    })
}
