use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::config::{ApiCredentials, Config, HTTP_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::types::{ApiEnvelope, Contest, StandingsResult, StandingsRow};

/// Where contest lists and standings come from.
#[async_trait]
pub trait StandingsSource: Send + Sync {
    /// All contests, newest first.
    async fn contest_list(&self) -> Result<Vec<Contest>>;

    /// Final standings of `contest_id`, official participants only.
    async fn standings(&self, contest_id: i64) -> Result<Vec<StandingsRow>>;
}

pub struct CodeforcesClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<ApiCredentials>,
}

impl CodeforcesClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.cf_api_url.trim_end_matches('/').to_string(),
            credentials: cfg.credentials.clone(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let query = match &self.credentials {
            Some(creds) => signed_query(method, params, creds, unix_now_secs(), random_nonce()),
            None => canonical_query(params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()),
        };
        let url = format!("{}/{}?{}", self.base_url, method, query);
        debug!(method, "Codeforces API call");

        // Failed calls come back as 4xx with a JSON envelope, so the body is read regardless of status.
        let envelope: ApiEnvelope<T> = self.client.get(&url).send().await?.json().await?;
        unwrap_envelope(envelope)
    }
}

#[async_trait]
impl StandingsSource for CodeforcesClient {
    async fn contest_list(&self) -> Result<Vec<Contest>> {
        self.call("contest.list", &[]).await
    }

    async fn standings(&self, contest_id: i64) -> Result<Vec<StandingsRow>> {
        let result: StandingsResult = self
            .call(
                "contest.standings",
                &[
                    ("contestId", contest_id.to_string()),
                    ("showUnofficial", "false".to_string()),
                ],
            )
            .await?;
        Ok(result.rows)
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    if envelope.status != "OK" {
        return Err(AppError::Api(
            envelope.comment.unwrap_or_else(|| format!("status {}", envelope.status)),
        ));
    }
    envelope
        .result
        .ok_or_else(|| AppError::Api("OK response without result".to_string()))
}

/// `k=v` pairs sorted by key, then value, joined with `&`.
pub fn canonical_query(mut params: Vec<(String, String)>) -> String {
    params.sort();
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Query string for an authenticated call: the method params plus `apiKey`
/// and `time`, in canonical order, followed by
/// `apiSig = nonce ++ hex(sha512("{nonce}/{method}?{query}#{secret}"))`.
pub fn signed_query(
    method: &str,
    params: &[(&str, String)],
    creds: &ApiCredentials,
    time: u64,
    nonce: u32,
) -> String {
    let mut all: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    all.push(("apiKey".to_string(), creds.key.clone()));
    all.push(("time".to_string(), time.to_string()));
    let query = canonical_query(all);

    let digest = Sha512::digest(format!("{nonce}/{method}?{query}#{}", creds.secret).as_bytes());
    format!("{query}&apiSig={nonce}{}", hex::encode(digest))
}

/// The `n` newest finished, rated contests, returned oldest first.
pub fn select_rated_contests(contests: Vec<Contest>, n: usize) -> Vec<Contest> {
    let mut selected: Vec<Contest> = contests
        .into_iter()
        .filter(Contest::is_rated_and_finished)
        .take(n)
        .collect();
    selected.reverse();
    selected
}

/// Six-digit nonce prefixed to every signature.
fn random_nonce() -> u32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
