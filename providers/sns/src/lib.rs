//! AWS SNS carrier adapter. Publishes directly to a phone number with a
//! SigV4-signed form POST; no AWS SDK involved.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sms_core::{
    normalize_destination, CredentialStore, ProviderReceipt, SendError, SendRequest, SendResult,
    SmsSender,
};
use time::OffsetDateTime;

mod sigv4;

pub const PROVIDER_ID: &str = "sns";

pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const REGION: &str = "AWS_REGION";
/// Optional alphanumeric sender id attached as a message attribute when set.
pub const SENDER_ID: &str = "SNS_SENDER_ID";

const REQUIRED_CREDENTIALS: &[&str] = &[ACCESS_KEY_ID, SECRET_ACCESS_KEY, REGION];
const SNS_API_VERSION: &str = "2010-03-31";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SnsSender {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialStore>,
    api_base: Option<String>,
    timeout: Duration,
}

impl SnsSender {
    /// `api_base` overrides the regional endpoint; production callers pass
    /// `None` and the endpoint is derived from `AWS_REGION` per dispatch.
    pub fn new(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialStore>,
        api_base: Option<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            api_base: api_base.map(|base| base.trim_end_matches('/').to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn credential(&self, key: &str) -> Result<String, SendError> {
        match self.credentials.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(SendError::CredentialsMissing),
        }
    }

    fn endpoint(&self, region: &str) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| format!("https://sns.{region}.amazonaws.com"))
    }

    fn publish_body(&self, request: &SendRequest) -> String {
        let to = format!(
            "+{}",
            normalize_destination(&request.destination, request.country_code())
        );
        let mut params: Vec<(&str, String)> = vec![
            ("Action", "Publish".into()),
            ("PhoneNumber", to),
            ("Message", request.body.clone()),
            ("Version", SNS_API_VERSION.into()),
        ];
        if let Some(sender_id) = self
            .credentials
            .get(SENDER_ID)
            .filter(|v| !v.trim().is_empty())
        {
            params.push(("MessageAttributes.entry.1.Name", "AWS.SNS.SMS.SenderID".into()));
            params.push(("MessageAttributes.entry.1.Value.DataType", "String".into()));
            params.push(("MessageAttributes.entry.1.Value.StringValue", sender_id));
        }
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[async_trait]
impl SmsSender for SnsSender {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn required_credentials(&self) -> &'static [&'static str] {
        REQUIRED_CREDENTIALS
    }

    async fn send(&self, request: &SendRequest) -> SendResult {
        let access_key = self.credential(ACCESS_KEY_ID)?;
        let secret_key = self.credential(SECRET_ACCESS_KEY)?;
        let region = self.credential(REGION)?;

        let endpoint = self.endpoint(&region);
        let body = self.publish_body(request);
        let signed = sigv4::sign_post(
            &sigv4::SigningParams {
                access_key: &access_key,
                secret_key: &secret_key,
                region: &region,
                service: "sns",
                host: host_of(&endpoint),
                body: &body,
            },
            OffsetDateTime::now_utc(),
        );

        let response = self
            .http
            .post(&endpoint)
            .header("content-type", sigv4::CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization)
            .body(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            let reason = xml_tag(&body, "Message")
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {}", status.as_u16()));
            tracing::warn!(
                provider = PROVIDER_ID,
                status = status.as_u16(),
                %reason,
                "sns rejected message"
            );
            return Err(SendError::CarrierRejected(reason));
        }

        // Success status without a MessageId is a broken response contract,
        // not a rejection by the carrier.
        let message_id = xml_tag(&body, "MessageId")
            .ok_or_else(|| {
                SendError::Transport("carrier accepted but response had no message id".into())
            })?
            .to_string();

        tracing::info!(provider = PROVIDER_ID, %message_id, "sns accepted message");
        Ok(ProviderReceipt { message_id })
    }
}

fn host_of(endpoint: &str) -> &str {
    let rest = endpoint.split("://").nth(1).unwrap_or(endpoint);
    rest.split('/').next().unwrap_or(rest)
}

/// First occurrence of `<tag>...</tag>`. SNS responses are small flat XML
/// documents; a full parser buys nothing here.
fn xml_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

fn transport(err: reqwest::Error) -> SendError {
    SendError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use sms_core::StaticCredentials;
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    struct Recorded {
        authorization: String,
        amz_date: String,
        body: String,
    }

    type Log = Arc<Mutex<Vec<Recorded>>>;

    #[derive(Clone)]
    struct CarrierScript {
        log: Log,
        status: StatusCode,
        body: String,
    }

    async fn record(
        State(script): State<CarrierScript>,
        headers: HeaderMap,
        body: String,
    ) -> impl IntoResponse {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        script.log.lock().unwrap().push(Recorded {
            authorization: header("authorization"),
            amz_date: header("x-amz-date"),
            body,
        });
        (script.status, script.body.clone())
    }

    async fn spawn_carrier(status: StatusCode, body: &str) -> (String, Log) {
        let log: Log = Arc::default();
        let script = CarrierScript {
            log: log.clone(),
            status,
            body: body.to_string(),
        };
        let app = Router::new().route("/", post(record)).with_state(script);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), log)
    }

    fn full_credentials() -> StaticCredentials {
        StaticCredentials::new()
            .with(ACCESS_KEY_ID, "AKIAEXAMPLE")
            .with(SECRET_ACCESS_KEY, "secret")
            .with(REGION, "us-east-1")
    }

    const PUBLISH_OK: &str = "<PublishResponse xmlns=\"http://sns.amazonaws.com/doc/2010-03-31/\">\
         <PublishResult><MessageId>a1b2c3d4</MessageId></PublishResult>\
         </PublishResponse>";

    #[tokio::test]
    async fn missing_credentials_short_circuit_without_network() {
        let store = StaticCredentials::new().with(ACCESS_KEY_ID, "AKIAEXAMPLE");
        let sender = SnsSender::new(
            reqwest::Client::new(),
            Arc::new(store),
            Some("http://127.0.0.1:1".into()),
        );
        let result = sender.send(&SendRequest::new("4165551234", "hi")).await;
        assert_eq!(result, Err(SendError::CredentialsMissing));
    }

    #[tokio::test]
    async fn accepted_publish_signs_and_normalizes() {
        let (base, log) = spawn_carrier(StatusCode::OK, PUBLISH_OK).await;
        let sender = SnsSender::new(
            reqwest::Client::new(),
            Arc::new(full_credentials()),
            Some(base),
        );

        let receipt = sender
            .send(&SendRequest::new("6135551234", "Your code is ABC123"))
            .await
            .unwrap();
        assert_eq!(receipt.message_id, "a1b2c3d4");

        let recorded = log.lock().unwrap().pop().unwrap();
        assert!(recorded.body.contains("Action=Publish"));
        assert!(recorded.body.contains("PhoneNumber=%2B16135551234"));
        assert!(recorded.body.contains("Message=Your%20code%20is%20ABC123"));
        assert!(recorded
            .authorization
            .starts_with("AWS4-HMAC-SHA256 Credential=AKIAEXAMPLE/"));
        assert!(recorded.authorization.contains("/us-east-1/sns/aws4_request"));
        assert!(recorded
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date"));
        assert_eq!(recorded.amz_date.len(), 16);
    }

    #[tokio::test]
    async fn sender_id_attribute_is_attached_when_configured() {
        let (base, log) = spawn_carrier(StatusCode::OK, PUBLISH_OK).await;
        let store = full_credentials().with(SENDER_ID, "Parkside");
        let sender = SnsSender::new(reqwest::Client::new(), Arc::new(store), Some(base));

        sender
            .send(&SendRequest::new("6135551234", "hi"))
            .await
            .unwrap();

        let recorded = log.lock().unwrap().pop().unwrap();
        assert!(recorded
            .body
            .contains("MessageAttributes.entry.1.Name=AWS.SNS.SMS.SenderID"));
        assert!(recorded
            .body
            .contains("MessageAttributes.entry.1.Value.StringValue=Parkside"));
    }

    #[tokio::test]
    async fn accepted_response_without_message_id_is_a_transport_error() {
        let (base, _log) = spawn_carrier(StatusCode::OK, "<PublishResponse></PublishResponse>").await;
        let sender = SnsSender::new(
            reqwest::Client::new(),
            Arc::new(full_credentials()),
            Some(base),
        );

        let result = sender.send(&SendRequest::new("6135551234", "hi")).await;
        assert!(matches!(result, Err(SendError::Transport(_))));
    }

    #[tokio::test]
    async fn rejection_preserves_carrier_error_text() {
        let error_xml = "<ErrorResponse xmlns=\"http://sns.amazonaws.com/doc/2010-03-31/\">\
             <Error><Type>Sender</Type><Code>InvalidClientTokenId</Code>\
             <Message>The security token included in the request is invalid.</Message></Error>\
             </ErrorResponse>";
        let (base, _log) = spawn_carrier(StatusCode::FORBIDDEN, error_xml).await;
        let sender = SnsSender::new(
            reqwest::Client::new(),
            Arc::new(full_credentials()),
            Some(base),
        );

        let result = sender.send(&SendRequest::new("6135551234", "hi")).await;
        assert_eq!(
            result,
            Err(SendError::CarrierRejected(
                "The security token included in the request is invalid.".into()
            ))
        );
    }

    #[test]
    fn xml_tag_extracts_first_match() {
        assert_eq!(
            xml_tag("<a><MessageId>abc</MessageId></a>", "MessageId"),
            Some("abc")
        );
        assert_eq!(xml_tag("<a></a>", "MessageId"), None);
    }

    #[test]
    fn host_of_strips_scheme_and_path() {
        assert_eq!(
            host_of("https://sns.us-east-1.amazonaws.com"),
            "sns.us-east-1.amazonaws.com"
        );
        assert_eq!(host_of("http://127.0.0.1:8080/extra"), "127.0.0.1:8080");
    }
}
