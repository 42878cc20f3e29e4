use crate::errors::{Result, ScmError};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use tracing::info;
use uuid::Uuid;

/// Consumer key plus the PEM-encoded RSA pair registered with an application link
#[derive(Debug, Clone)]
pub struct ConsumerKeyMaterial {
    pub consumer_key: String,
    /// PKCS#1 `RSA PRIVATE KEY`
    pub private_key: String,
    /// SubjectPublicKeyInfo `PUBLIC KEY`, the form Bitbucket Server asks for
    pub public_key: String,
}

/// 32 lowercase hex chars
pub fn generate_consumer_key() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn generate_key_material(bits: usize) -> Result<ConsumerKeyMaterial> {
    let mut rng = rsa::rand_core::OsRng;
    let private = RsaPrivateKey::new(&mut rng, bits)
        .map_err(|e| ScmError::crypto(format!("Failed to generate RSA key: {e}")))?;

    let private_key = private
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| ScmError::crypto(format!("Failed to encode private key: {e}")))?
        .to_string();
    let public_key = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| ScmError::crypto(format!("Failed to encode public key: {e}")))?;

    info!("Generated {}-bit RSA consumer key pair", bits);
    Ok(ConsumerKeyMaterial {
        consumer_key: generate_consumer_key(),
        private_key,
        public_key,
    })
}

/// Parse a PKCS#1 PEM private key
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    if pem.trim().is_empty() {
        return Err(ScmError::decode("private key is empty"));
    }
    RsaPrivateKey::from_pkcs1_pem(pem.trim())
        .map_err(|e| ScmError::decode(format!("Failed to parse private key: {e}")))
}
