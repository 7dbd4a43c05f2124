//! Shared test doubles for the STS identity endpoint.
//!
//! Declares `{method, path, body}` to `{status, body, content-type}`
//! mappings and replays them through the SDK's recording HTTP client, so
//! tests exercise the full request pipeline without a network.

use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use aws_smithy_types::body::SdkBody;

/// Default regional STS endpoint the SDK resolves for `us-west-2`.
pub const STS_US_WEST_2: &str = "https://sts.us-west-2.amazonaws.com";

pub const GET_CALLER_IDENTITY_REQUEST_BODY: &str = "Action=GetCallerIdentity&Version=2011-06-15";

pub const GET_CALLER_IDENTITY_VALID_RESPONSE: &str = r#"<GetCallerIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <GetCallerIdentityResult>
    <Arn>arn:aws:iam::222222222222:user/Alice</Arn>
    <UserId>AKIAI44QH8DHBEXAMPLE</UserId>
    <Account>222222222222</Account>
  </GetCallerIdentityResult>
  <ResponseMetadata>
    <RequestId>01234567-89ab-cdef-0123-456789abcdef</RequestId>
  </ResponseMetadata>
</GetCallerIdentityResponse>"#;

pub const STS_ACCESS_DENIED_RESPONSE: &str = r#"<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type>Sender</Type>
    <Code>AccessDenied</Code>
    <Message>User: arn:aws:iam::222222222222:user/Alice is not authorized to perform: sts:GetCallerIdentity</Message>
  </Error>
  <RequestId>4d0cf5ec-892a-4d3f-a230-30039e241bed</RequestId>
</ErrorResponse>"#;

pub const STS_EXPIRED_TOKEN_RESPONSE: &str = r#"<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type>Sender</Type>
    <Code>ExpiredToken</Code>
    <Message>The security token included in the request is expired</Message>
  </Error>
  <RequestId>4d0cf5ec-892a-4d3f-a230-30039e241bed</RequestId>
</ErrorResponse>"#;

pub struct MockRequest {
    pub method: &'static str,
    pub path: &'static str,
    pub body: &'static str,
}

pub struct MockResponse {
    pub status: u16,
    pub body: &'static str,
    pub content_type: &'static str,
}

pub struct MockEndpoint {
    pub request: MockRequest,
    pub response: MockResponse,
}

impl MockEndpoint {
    pub fn get_caller_identity_ok() -> Self {
        Self::get_caller_identity(200, GET_CALLER_IDENTITY_VALID_RESPONSE)
    }

    pub fn get_caller_identity_denied() -> Self {
        Self::get_caller_identity(403, STS_ACCESS_DENIED_RESPONSE)
    }

    pub fn get_caller_identity_expired() -> Self {
        Self::get_caller_identity(400, STS_EXPIRED_TOKEN_RESPONSE)
    }

    fn get_caller_identity(status: u16, body: &'static str) -> Self {
        Self {
            request: MockRequest {
                method: "POST",
                path: "/",
                body: GET_CALLER_IDENTITY_REQUEST_BODY,
            },
            response: MockResponse {
                status,
                body,
                content_type: "text/xml",
            },
        }
    }
}

/// Build a replaying HTTP client serving the declared endpoints in order.
///
/// Returns the replay handle (for request assertions) alongside the shared
/// client to inject into a `Config`.
pub fn mock_api_client(
    base_url: &str,
    endpoints: &[MockEndpoint],
) -> (StaticReplayClient, SharedHttpClient) {
    let events = endpoints
        .iter()
        .map(|endpoint| {
            ReplayEvent::new(
                http::Request::builder()
                    .method(endpoint.request.method)
                    .uri(format!("{base_url}{}", endpoint.request.path))
                    .body(SdkBody::from(endpoint.request.body))
                    .unwrap(),
                http::Response::builder()
                    .status(endpoint.response.status)
                    .header("content-type", endpoint.response.content_type)
                    .body(SdkBody::from(endpoint.response.body))
                    .unwrap(),
            )
        })
        .collect();
    let replay = StaticReplayClient::new(events);
    let shared = SharedHttpClient::new(replay.clone());
    (replay, shared)
}

/// Request headers that vary run to run and are ignored when matching.
pub const VOLATILE_HEADERS: &[&str] = &[
    "authorization",
    "content-length",
    "content-type",
    "user-agent",
    "x-amz-user-agent",
    "x-amz-date",
    "x-amz-security-token",
    "amz-sdk-invocation-id",
    "amz-sdk-request",
];
