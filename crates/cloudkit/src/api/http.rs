//! Blocking HTTP clients for the remote services.
//!
//! Each client owns a [`ureq::Agent`] and the credentials it authenticates
//! with. Construction performs no network I/O; connections are established
//! on the first request. Non-2xx responses are read back so the API's own
//! rejection message survives into the error context.

use crate::api::{
    Instance, StackApi, StackDescription, StackEvent, StackResource, StackSummary,
};
use crate::api::ComputeApi;
use crate::error::{Error, Result};
use crate::registry::Credentials;
use formation::StackDefinition;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use ureq::Agent;

/// Per-request timeout applied by the transport.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn build_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build()
        .new_agent()
}

/// Read a successful JSON response, or surface the API's rejection.
fn read_response<T: DeserializeOwned>(
    context: &str,
    result: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<T> {
    let mut response = result.map_err(|e| Error::transport(context, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::api(context, status.as_u16(), rejection_message(&mut response)));
    }
    response
        .body_mut()
        .read_json()
        .map_err(|e| Error::payload(context, e))
}

/// Check status on a response whose body does not matter.
fn read_empty(
    context: &str,
    result: std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error>,
) -> Result<()> {
    let mut response = result.map_err(|e| Error::transport(context, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::api(context, status.as_u16(), rejection_message(&mut response)));
    }
    Ok(())
}

fn rejection_message(response: &mut ureq::http::Response<ureq::Body>) -> String {
    let status = response.status();
    response
        .body_mut()
        .read_json::<ErrorEnvelope>()
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string()
        })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Orchestration
// ============================================================================

/// Blocking client for the stack orchestration service.
pub struct HttpStackClient {
    agent: Agent,
    endpoint: String,
    credentials: Credentials,
}

impl HttpStackClient {
    /// Create a client against the region's default endpoint.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        let endpoint = default_endpoint("orchestration", &credentials.region);
        Self::with_endpoint(credentials, endpoint)
    }

    /// Create a client against a custom endpoint (private deployments, tests).
    #[must_use]
    pub fn with_endpoint(credentials: Credentials, endpoint: impl Into<String>) -> Self {
        Self {
            agent: build_agent(),
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn stacks_url(&self) -> String {
        format!("{}/v1/stacks", self.endpoint)
    }

    fn stack_url(&self, name: &str) -> String {
        format!("{}/v1/stacks/{name}", self.endpoint)
    }

    fn authed<B>(&self, builder: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        builder
            .header("X-Access-Key-Id", &self.credentials.access_key_id)
            .header("X-Secret-Access-Key", &self.credentials.secret_key)
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitStackBody<'a> {
    stack_name: &'a str,
    #[serde(flatten)]
    definition: &'a StackDefinition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitResponse {
    stack_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeResponse {
    stack: StackDescription,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListResponse {
    stack_summaries: Vec<StackSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EventsResponse {
    stack_events: Vec<StackEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResourcesResponse {
    stack_resources: Vec<StackResource>,
}

impl StackApi for HttpStackClient {
    fn create_stack(&self, name: &str, definition: &StackDefinition) -> Result<String> {
        let context = format!("create of stack '{name}' failed");
        let body = SubmitStackBody {
            stack_name: name,
            definition,
        };
        let result = self.authed(self.agent.post(&self.stacks_url())).send_json(&body);
        read_response::<SubmitResponse>(&context, result).map(|r| r.stack_id)
    }

    fn update_stack(&self, name: &str, definition: &StackDefinition) -> Result<String> {
        let context = format!("update of stack '{name}' failed");
        let body = SubmitStackBody {
            stack_name: name,
            definition,
        };
        let result = self
            .authed(self.agent.put(&self.stack_url(name)))
            .send_json(&body);
        read_response::<SubmitResponse>(&context, result).map(|r| r.stack_id)
    }

    fn delete_stack(&self, name: &str) -> Result<()> {
        let context = format!("delete of stack '{name}' failed");
        let result = self.authed(self.agent.delete(&self.stack_url(name))).call();
        read_empty(&context, result)
    }

    fn describe_stack(&self, name: &str) -> Result<StackDescription> {
        let context = format!("describe of stack '{name}' failed");
        let result = self.authed(self.agent.get(&self.stack_url(name))).call();
        read_response::<DescribeResponse>(&context, result).map(|r| r.stack)
    }

    fn list_stacks(&self, status_filter: &[String]) -> Result<Vec<StackSummary>> {
        let context = "list of stacks failed";
        let mut request = self.authed(self.agent.get(&self.stacks_url()));
        for status in status_filter {
            request = request.query("status", status);
        }
        read_response::<ListResponse>(context, request.call()).map(|r| r.stack_summaries)
    }

    fn describe_events(&self, name: &str) -> Result<Vec<StackEvent>> {
        let context = format!("event listing for stack '{name}' failed");
        let url = format!("{}/events", self.stack_url(name));
        let result = self.authed(self.agent.get(&url)).call();
        read_response::<EventsResponse>(&context, result).map(|r| r.stack_events)
    }

    fn describe_resources(&self, name: &str) -> Result<Vec<StackResource>> {
        let context = format!("resource listing for stack '{name}' failed");
        let url = format!("{}/resources", self.stack_url(name));
        let result = self.authed(self.agent.get(&url)).call();
        read_response::<ResourcesResponse>(&context, result).map(|r| r.stack_resources)
    }
}

// ============================================================================
// Compute
// ============================================================================

/// Blocking client for the compute service.
pub struct HttpComputeClient {
    agent: Agent,
    endpoint: String,
    credentials: Credentials,
}

impl HttpComputeClient {
    /// Create a client against the region's default endpoint.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        let endpoint = default_endpoint("compute", &credentials.region);
        Self::with_endpoint(credentials, endpoint)
    }

    /// Create a client against a custom endpoint.
    #[must_use]
    pub fn with_endpoint(credentials: Credentials, endpoint: impl Into<String>) -> Self {
        Self {
            agent: build_agent(),
            endpoint: endpoint.into(),
            credentials,
        }
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstancesResponse {
    instances: Vec<Instance>,
}

impl ComputeApi for HttpComputeClient {
    fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<Instance>> {
        let context = "instance listing failed";
        let url = format!("{}/v1/instances", self.endpoint);
        let mut request = self
            .agent
            .get(&url)
            .header("X-Access-Key-Id", &self.credentials.access_key_id)
            .header("X-Secret-Access-Key", &self.credentials.secret_key);
        for id in instance_ids {
            request = request.query("id", id);
        }
        read_response::<InstancesResponse>(context, request.call()).map(|r| r.instances)
    }
}

fn default_endpoint(service: &str, region: &str) -> String {
    format!("https://{service}.{region}.stratus.cloud")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            access_key_id: "AKID".to_string(),
            secret_key: "secret".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_default_endpoint_per_service() {
        let stacks = HttpStackClient::new(credentials());
        assert_eq!(stacks.endpoint(), "https://orchestration.us-east-1.stratus.cloud");

        let compute = HttpComputeClient::new(credentials());
        assert_eq!(compute.endpoint(), "https://compute.us-east-1.stratus.cloud");
    }

    #[test]
    fn test_custom_endpoint() {
        let client = HttpStackClient::with_endpoint(credentials(), "http://localhost:4569");
        assert_eq!(client.endpoint(), "http://localhost:4569");
        assert_eq!(client.stacks_url(), "http://localhost:4569/v1/stacks");
        assert_eq!(
            client.stack_url("web"),
            "http://localhost:4569/v1/stacks/web"
        );
    }

    #[test]
    fn test_submit_body_wire_shape() {
        let definition = StackDefinition {
            template_body: "{}".to_string(),
            parameters: Vec::new(),
            capabilities: vec!["CAPABILITY_IAM".to_string()],
            notification_targets: Vec::new(),
            disable_rollback: false,
            timeout_in_minutes: Some(15),
        };
        let body = SubmitStackBody {
            stack_name: "web",
            definition: &definition,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["StackName"], "web");
        assert_eq!(value["TemplateBody"], "{}");
        assert_eq!(value["Capabilities"][0], "CAPABILITY_IAM");
        assert_eq!(value["TimeoutInMinutes"], 15);
    }
}
