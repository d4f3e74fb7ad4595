use crate::error::{DeployError, DeployResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const DOMAIN: &[u8] = b"pages-deployer/shared-secret";

/// Checks the secret supplied with a job against the configured one.
///
/// Each secret is the message of an HMAC-SHA256 keyed with a fixed domain
/// string, and the tags are compared with `verify_slice`, which is
/// constant-time. Secrets are never used as the HMAC key: keys are zero-padded
/// and long keys are hashed, which would make distinct secrets collide.
pub fn verify_shared_secret(configured: &str, supplied: &str) -> DeployResult<()> {
    if configured.is_empty() {
        return Err(DeployError::InvalidSecret);
    }

    let expected = tag(configured)?.finalize().into_bytes();
    tag(supplied)?
        .verify_slice(&expected)
        .map_err(|_| DeployError::InvalidSecret)
}

fn tag(secret: &str) -> DeployResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(DOMAIN).map_err(|_| DeployError::InvalidSecret)?;
    mac.update(secret.as_bytes());
    Ok(mac)
}
