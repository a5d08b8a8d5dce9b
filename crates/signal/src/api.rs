//! Thin client for the signal-cli REST API.
//!
//! Request and response bodies mirror the daemon's JSON. Everything above
//! this module works with `sigrelay_common::types`.

use std::time::Duration;

use {
    reqwest::{
        Client, RequestBuilder, Response, StatusCode,
        header::{HeaderMap, RETRY_AFTER},
    },
    serde::{Deserialize, Deserializer, Serialize},
    tracing::{debug, warn},
    url::Url,
};

use crate::{
    config::SignalAccountConfig,
    error::{Error, Result},
};

/// Retries for a request the daemon answers with 429.
const RATE_LIMIT_MAX_RETRIES: usize = 4;

/// Wait between rate-limited attempts when the daemon gives no `Retry-After`.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(2);

/// Longest `Retry-After` honoured. The receive loop is single-task, so a
/// longer wait would stall every message behind it.
const RATE_LIMIT_MAX_WAIT: Duration = Duration::from_secs(30);

// ── Response types ──────────────────────────────────────────────────────────

/// Response from `/v1/about`.
#[derive(Debug, Default, Deserialize)]
pub struct AboutResponse {
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub build: Option<u64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One item from `/v1/receive`.
#[derive(Debug, Default, Deserialize)]
pub struct ReceivedEnvelope {
    /// Absent for some daemon notices.
    #[serde(default)]
    pub envelope: Option<Envelope>,
    #[serde(default)]
    pub account: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_number: Option<String>,
    #[serde(default)]
    pub source_uuid: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub data_message: Option<DataMessage>,
    /// Present on messages we sent from a linked device. Never commands.
    #[serde(default)]
    pub sync_message: Option<serde_json::Value>,
    #[serde(default)]
    pub receipt_message: Option<serde_json::Value>,
    #[serde(default)]
    pub typing_message: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMessage {
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub group_info: Option<GroupRef>,
    #[serde(default)]
    pub mentions: Vec<MentionRef>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub sticker: Option<StickerRef>,
    #[serde(default)]
    pub reaction: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    /// Raw group id (the group's `internal_id`).
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MentionRef {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub length: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerRef {
    #[serde(default)]
    pub pack_id: Option<String>,
    #[serde(default)]
    pub sticker_id: Option<u32>,
}

/// One item from `/v1/contacts/{number}`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactEntry {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub profile: Option<ProfileEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileEntry {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub about_emoji: Option<String>,
    #[serde(default)]
    pub mobile_coin_address: Option<String>,
    #[serde(default)]
    pub has_avatar: bool,
    /// Unix epoch milliseconds; `0` when never fetched.
    #[serde(default)]
    pub last_updated_timestamp: Option<i64>,
}

/// One item from `/v1/groups/{number}`.
#[derive(Debug, Default, Deserialize)]
pub struct GroupEntry {
    /// Send id, `group.<base64>`.
    pub id: String,
    #[serde(default)]
    pub internal_id: String,
    #[serde(default)]
    pub name: String,
}

/// Response from `/v2/send`.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    #[serde(deserialize_with = "timestamp_from_number_or_string")]
    pub timestamp: i64,
}

// ── Request types ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
pub struct SendRequest {
    pub number: String,
    pub recipients: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub base64_attachments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReactionRequest {
    pub reaction: String,
    pub recipient: String,
    pub target_author: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct ReceiptRequest {
    pub receipt_type: &'static str,
    pub recipient: String,
    pub timestamp: i64,
}

// ── Client ──────────────────────────────────────────────────────────────────

/// signal-cli REST API client bound to one account.
#[derive(Debug, Clone)]
pub struct SignalApi {
    client: Client,
    base_url: Url,
    account: String,
}

impl SignalApi {
    pub fn new(config: &SignalAccountConfig) -> Result<Self> {
        validate_phone_number(&config.account)?;
        let base_url = Url::parse(&config.api_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::message(format!(
                "signal-cli API URL must be http or https, got: {}",
                config.api_url
            )));
        }
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url,
            account: config.account.clone(),
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// `GET /v1/about`: confirms the daemon is up.
    pub async fn about(&self) -> Result<AboutResponse> {
        let url = self.endpoint(&["v1", "about"])?;
        let resp = self
            .request_with_retry("about", || self.client.get(url.clone()))
            .await?;
        Ok(resp.json().await?)
    }

    /// `GET /v1/receive/{number}`: long-polls for pending envelopes.
    pub async fn receive(&self, timeout_secs: u64) -> Result<Vec<ReceivedEnvelope>> {
        let mut url = self.endpoint(&["v1", "receive", &self.account])?;
        url.query_pairs_mut()
            .append_pair("timeout", &timeout_secs.to_string());
        let resp = self
            .request_with_retry("receive", || self.client.get(url.clone()))
            .await?;
        Ok(resp.json().await?)
    }

    /// `POST /v2/send`.
    pub async fn send(&self, request: &SendRequest) -> Result<SendResponse> {
        let url = self.endpoint(&["v2", "send"])?;
        debug!(
            recipients = ?request.recipients,
            attachments = request.base64_attachments.len(),
            "signal send"
        );
        let resp = self
            .request_with_retry("send", || self.client.post(url.clone()).json(request))
            .await?;
        Ok(resp.json().await?)
    }

    /// `POST /v1/reactions/{number}`.
    pub async fn react(&self, request: &ReactionRequest) -> Result<()> {
        let url = self.endpoint(&["v1", "reactions", &self.account])?;
        self.request_with_retry("react", || self.client.post(url.clone()).json(request))
            .await?;
        Ok(())
    }

    /// `POST /v1/receipts/{number}`.
    pub async fn receipt(&self, request: &ReceiptRequest) -> Result<()> {
        let url = self.endpoint(&["v1", "receipts", &self.account])?;
        self.request_with_retry("receipt", || self.client.post(url.clone()).json(request))
            .await?;
        Ok(())
    }

    /// `GET /v1/contacts/{number}`.
    pub async fn contacts(&self) -> Result<Vec<ContactEntry>> {
        let url = self.endpoint(&["v1", "contacts", &self.account])?;
        let resp = self
            .request_with_retry("list contacts", || self.client.get(url.clone()))
            .await?;
        Ok(resp.json().await?)
    }

    /// `GET /v1/groups/{number}`.
    pub async fn groups(&self) -> Result<Vec<GroupEntry>> {
        let url = self.endpoint(&["v1", "groups", &self.account])?;
        let resp = self
            .request_with_retry("list groups", || self.client.get(url.clone()))
            .await?;
        Ok(resp.json().await?)
    }

    /// `GET /v1/attachments/{id}`: raw bytes of a received attachment.
    pub async fn attachment(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&["v1", "attachments", id])?;
        let resp = self
            .request_with_retry("fetch attachment", || self.client.get(url.clone()))
            .await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// `GET /v1/contacts/{number}/{uuid}/avatar`. `None` when the contact
    /// has no avatar.
    pub async fn avatar(&self, uuid: &str) -> Result<Option<Vec<u8>>> {
        let url = self.endpoint(&["v1", "contacts", &self.account, uuid, "avatar"])?;
        match self
            .request_with_retry("fetch avatar", || self.client.get(url.clone()))
            .await
        {
            Ok(resp) => Ok(Some(resp.bytes().await?.to_vec())),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::message(format!("invalid signal-cli API URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request_with_retry<F>(&self, operation: &'static str, request: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        run_with_retry(operation, || request().send()).await
    }
}

/// Send a request, retrying while the daemon answers 429. Non-success
/// statuses become [`Error::Api`].
async fn run_with_retry<F, Fut>(operation: &'static str, mut request: F) -> Result<Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = reqwest::Result<Response>>,
{
    let mut retries = 0usize;

    loop {
        let resp = request().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status != StatusCode::TOO_MANY_REQUESTS {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let wait = retry_after(resp.headers()).unwrap_or(RATE_LIMIT_BACKOFF);
        if retries >= RATE_LIMIT_MAX_RETRIES {
            warn!(
                operation,
                retries,
                max_retries = RATE_LIMIT_MAX_RETRIES,
                "signal-cli rate limit persisted after retries"
            );
            return Err(Error::RateLimited { operation, retries });
        }

        retries += 1;
        warn!(
            operation,
            retries,
            max_retries = RATE_LIMIT_MAX_RETRIES,
            retry_after_secs = wait.as_secs(),
            "signal-cli rate limited, waiting before retry"
        );
        tokio::time::sleep(wait).await;
    }
}

/// `Retry-After` in seconds, capped at [`RATE_LIMIT_MAX_WAIT`].
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(RATE_LIMIT_MAX_WAIT))
}

/// The daemon reports send timestamps as a string in some versions and a
/// number in others.
fn timestamp_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => Ok(n),
        Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ── Validation ──────────────────────────────────────────────────────────────

/// Validate a phone number against E.164: `+` then 1-15 digits.
pub fn validate_phone_number(number: &str) -> Result<()> {
    let Some(digits) = number.strip_prefix('+') else {
        return Err(Error::message(format!(
            "phone number must start with '+' (E.164 format), got: {number}"
        )));
    };

    if digits.is_empty() || digits.len() > 15 {
        return Err(Error::message(format!(
            "phone number must have 1-15 digits after '+' (E.164 format), got {} digits",
            digits.len()
        )));
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::message(format!(
            "phone number must contain only digits after '+' (E.164 format), got: {number}"
        )));
    }

    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    fn api(server: &mockito::ServerGuard) -> SignalApi {
        SignalApi::new(&SignalAccountConfig {
            api_url: server.url(),
            account: "+15550001".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case("+15551234567", true)]
    #[case("+1", true)]
    #[case("15551234567", false)]
    #[case("+", false)]
    #[case("+1555abc", false)]
    #[case("+1234567890123456", false)]
    fn phone_number_validation(#[case] number: &str, #[case] ok: bool) {
        assert_eq!(validate_phone_number(number).is_ok(), ok);
    }

    #[rstest]
    #[case(Some("0"), Some(Duration::ZERO))]
    #[case(Some("5"), Some(Duration::from_secs(5)))]
    #[case(Some("86400"), Some(RATE_LIMIT_MAX_WAIT))]
    #[case(Some("Wed, 21 Oct 2026 07:28:00 GMT"), None)]
    #[case(None, None)]
    fn retry_after_is_capped(#[case] header: Option<&str>, #[case] expected: Option<Duration>) {
        let mut headers = HeaderMap::new();
        if let Some(value) = header {
            headers.insert(RETRY_AFTER, value.parse().unwrap());
        }
        assert_eq!(retry_after(&headers), expected);
    }

    #[test]
    fn rejects_bad_account_and_url() {
        let bad_number = SignalAccountConfig {
            account: "5550001".into(),
            ..Default::default()
        };
        assert!(SignalApi::new(&bad_number).is_err());

        let bad_scheme = SignalAccountConfig {
            account: "+15550001".into(),
            api_url: "ftp://localhost".into(),
            ..Default::default()
        };
        assert!(SignalApi::new(&bad_scheme).is_err());
    }

    #[test]
    fn endpoint_encodes_segments_and_keeps_base_path() {
        let api = SignalApi::new(&SignalAccountConfig {
            api_url: "http://localhost:8080/signal/".into(),
            account: "+15550001".into(),
            ..Default::default()
        })
        .unwrap();
        let url = api.endpoint(&["v1", "receive", api.account()]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/signal/v1/receive/+15550001");
    }

    #[test]
    fn send_response_accepts_string_or_number() {
        let a: SendResponse = serde_json::from_value(json!({"timestamp": "1700000000123"})).unwrap();
        let b: SendResponse = serde_json::from_value(json!({"timestamp": 1700000000123_i64})).unwrap();
        assert_eq!(a.timestamp, 1_700_000_000_123);
        assert_eq!(b.timestamp, a.timestamp);
    }

    #[tokio::test]
    async fn about_reports_daemon_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/about")
            .with_status(200)
            .with_body(r#"{"versions":["v1","v2"],"build":2,"mode":"normal","version":"0.90"}"#)
            .create_async()
            .await;

        let about = api(&server).about().await.unwrap();
        assert_eq!(about.mode.as_deref(), Some("normal"));
        assert_eq!(about.versions, vec!["v1", "v2"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn receive_passes_timeout_and_parses_envelopes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/receive/+15550001")
            .match_query(mockito::Matcher::UrlEncoded("timeout".into(), "7".into()))
            .with_status(200)
            .with_body(
                json!([{
                    "account": "+15550001",
                    "envelope": {
                        "sourceNumber": "+15550002",
                        "sourceUuid": "u-2",
                        "timestamp": 99,
                        "dataMessage": {
                            "timestamp": 99,
                            "message": "hi",
                            "groupInfo": {"groupId": "abc=", "type": "DELIVER"},
                            "mentions": [{"number": "+15550001", "uuid": "u-1", "start": 0, "length": 1}]
                        }
                    }
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let envelopes = api(&server).receive(7).await.unwrap();
        mock.assert_async().await;
        let envelope = envelopes[0].envelope.as_ref().unwrap();
        let data = envelope.data_message.as_ref().unwrap();
        assert_eq!(data.message.as_deref(), Some("hi"));
        assert_eq!(
            data.group_info.as_ref().unwrap().group_id.as_deref(),
            Some("abc=")
        );
        assert_eq!(data.mentions[0].length, 1);
    }

    #[tokio::test]
    async fn send_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/send")
            .match_body(mockito::Matcher::PartialJson(json!({
                "number": "+15550001",
                "recipients": ["group.YWJj"],
                "message": "hello",
                "quote_timestamp": 5,
                "quote_author": "+15550002",
            })))
            .with_status(201)
            .with_body(r#"{"timestamp":"12345"}"#)
            .create_async()
            .await;

        let sent = api(&server)
            .send(&SendRequest {
                number: "+15550001".into(),
                recipients: vec!["group.YWJj".into()],
                message: "hello".into(),
                quote_timestamp: Some(5),
                quote_author: Some("+15550002".into()),
                quote_message: Some("orig".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sent.timestamp, 12345);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/groups/+15550001")
            .with_status(400)
            .with_body(r#"{"error":"user not registered"}"#)
            .create_async()
            .await;

        let err = api(&server).groups().await.unwrap_err();
        match err {
            Error::Api {
                operation,
                status,
                body,
            } => {
                assert_eq!(operation, "list groups");
                assert_eq!(status, 400);
                assert!(body.contains("user not registered"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_gives_up_after_max_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/reactions/+15550001")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(RATE_LIMIT_MAX_RETRIES + 1)
            .create_async()
            .await;

        let err = api(&server)
            .react(&ReactionRequest {
                reaction: "👍".into(),
                recipient: "+15550002".into(),
                target_author: "+15550002".into(),
                timestamp: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited { retries: 4, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_avatar_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/contacts/+15550001/u-2/avatar")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/v1/contacts/+15550001/u-3/avatar")
            .with_status(200)
            .with_body([0x89, b'P', b'N', b'G'])
            .create_async()
            .await;

        let api = api(&server);
        assert_eq!(api.avatar("u-2").await.unwrap(), None);
        assert_eq!(api.avatar("u-3").await.unwrap().unwrap().len(), 4);
    }
}
