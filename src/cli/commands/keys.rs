use crate::cli::output::Output;
use crate::config::Settings;
use crate::errors::{Result, ScmError};
use crate::oauth1::generate_key_material;
use serde_json::json;

/// Generate a consumer key and RSA pair for a Bitbucket Server application link
pub async fn run(settings: &Settings, bits: Option<usize>) -> Result<()> {
    let bits = bits.unwrap_or(settings.bitbucket_server.key_bits);
    if bits < 1024 {
        return Err(ScmError::validation(format!(
            "RSA key size must be at least 1024 bits, got {bits}"
        )));
    }

    let material = tokio::task::spawn_blocking(move || generate_key_material(bits))
        .await
        .map_err(|e| ScmError::crypto(format!("Key generation task failed: {e}")))??;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "consumerKey": material.consumer_key,
            "publicKey": material.public_key,
            "privateKey": material.private_key,
        }))?
    );

    Output::success(format!("Generated {bits}-bit consumer key pair"));
    Output::tip("Register the consumer key and public key as an incoming application link");
    Ok(())
}
