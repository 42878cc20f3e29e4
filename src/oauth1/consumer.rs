use super::keys::parse_private_key;
use super::signature::{
    percent_encode, sign_rsa_sha1, signature_base_string, OAUTH_VERSION, SIGNATURE_METHOD,
};
use crate::errors::{Result, ScmError};
use reqwest::{Client, Method, RequestBuilder};
use rsa::pkcs1v15::SigningKey;
use rsa::RsaPrivateKey;
use sha1::Sha1;
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

/// Token endpoints of an OAuth1 service provider
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProvider {
    pub request_token_url: String,
    pub authorize_token_url: String,
    pub access_token_url: String,
    pub http_method: Method,
}

impl ServiceProvider {
    /// Bitbucket Server application-link endpoints under `host`
    pub fn bitbucket_server(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            request_token_url: format!("{host}/plugins/servlet/oauth/request-token"),
            authorize_token_url: format!("{host}/plugins/servlet/oauth/authorize"),
            access_token_url: format!("{host}/plugins/servlet/oauth/access-token"),
            http_method: Method::POST,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
    /// Any other fields the provider returned
    pub additional: BTreeMap<String, String>,
}

/// RSA-SHA1 signing consumer for the three-legged flow
pub struct OAuth1Consumer {
    consumer_key: String,
    signing_key: SigningKey<Sha1>,
    provider: ServiceProvider,
    http: Client,
}

impl std::fmt::Debug for OAuth1Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Consumer")
            .field("consumer_key", &self.consumer_key)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl OAuth1Consumer {
    pub fn new(
        consumer_key: &str,
        private_key: RsaPrivateKey,
        provider: ServiceProvider,
        http: Client,
    ) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            signing_key: SigningKey::<Sha1>::new(private_key),
            provider,
            http,
        }
    }

    /// Build a Bitbucket Server consumer from a stored PEM key.
    ///
    /// A key that does not decode fails here, before any request is made.
    pub fn from_pem(
        consumer_key: &str,
        private_key_pem: &str,
        host: &str,
        http: Client,
    ) -> Result<Self> {
        let private_key = parse_private_key(private_key_pem)?;
        Ok(Self::new(
            consumer_key,
            private_key,
            ServiceProvider::bitbucket_server(host),
            http,
        ))
    }

    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// `Authorization` header value for a request
    pub fn authorization_header(
        &self,
        method: &Method,
        url: &str,
        token: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<String> {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_at(method, url, token, extra, &nonce, &timestamp)
    }

    pub(crate) fn authorization_header_at(
        &self,
        method: &Method,
        url: &str,
        token: Option<&str>,
        extra: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String> {
        let parsed = Url::parse(url)?;

        let mut params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer_key.clone()),
            ("oauth_nonce".into(), nonce.to_string()),
            ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_version".into(), OAUTH_VERSION.into()),
        ];
        if let Some(token) = token {
            params.push(("oauth_token".into(), token.to_string()));
        }
        params.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let base = signature_base_string(method.as_str(), &parsed, &params);
        let signature = sign_rsa_sha1(&self.signing_key, &base)?;
        params.push(("oauth_signature".into(), signature));
        params.sort();

        let fields = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }

    /// First leg: obtain a temporary token and the URL the user must visit
    pub async fn get_request_token_and_url(
        &self,
        callback_url: &str,
    ) -> Result<(RequestToken, String)> {
        let url = &self.provider.request_token_url;
        debug!("Requesting OAuth1 request token from {}", url);

        let header = self.authorization_header(
            &self.provider.http_method,
            url,
            None,
            &[("oauth_callback", callback_url)],
        )?;
        let fields = self.token_request(url, header).await?;

        let token = fields
            .get("oauth_token")
            .filter(|t| !t.is_empty())
            .cloned()
            .ok_or_else(|| ScmError::remote("request token response has no oauth_token"))?;
        let secret = fields.get("oauth_token_secret").cloned().unwrap_or_default();

        let login_url = format!(
            "{}?oauth_token={}",
            self.provider.authorize_token_url,
            percent_encode(&token)
        );
        Ok((RequestToken { token, secret }, login_url))
    }

    /// Third leg: trade an authorized request token for an access token
    pub async fn authorize_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken> {
        let url = &self.provider.access_token_url;
        debug!("Exchanging OAuth1 request token at {}", url);

        let extra: Vec<(&str, &str)> = if verifier.is_empty() {
            Vec::new()
        } else {
            vec![("oauth_verifier", verifier)]
        };
        let header = self.authorization_header(
            &self.provider.http_method,
            url,
            Some(&request_token.token),
            &extra,
        )?;
        let mut fields = self.token_request(url, header).await?;

        let token = fields
            .remove("oauth_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScmError::remote("access token response has no oauth_token"))?;
        let secret = fields.remove("oauth_token_secret").unwrap_or_default();

        info!("Obtained OAuth1 access token from {}", url);
        Ok(AccessToken {
            token,
            secret,
            additional: fields,
        })
    }

    /// A request signed with `access_token`
    pub fn signed_request(
        &self,
        method: Method,
        url: &str,
        access_token: &str,
    ) -> Result<RequestBuilder> {
        let header = self.authorization_header(&method, url, Some(access_token), &[])?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, header))
    }

    async fn token_request(&self, url: &str, header: String) -> Result<BTreeMap<String, String>> {
        let response = self
            .http
            .request(self.provider.http_method.clone(), url)
            .header(reqwest::header::AUTHORIZATION, header)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ScmError::remote_api(status.as_u16(), body));
        }

        Ok(url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect())
    }
}
