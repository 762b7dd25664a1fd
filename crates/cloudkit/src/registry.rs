//! Connection registry: one memoized client handle per logical service.
//!
//! Credentials are supplied once at construction and never change; a second
//! credential set requires a second registry. Handles are built lazily (no
//! network I/O until the first request) and live for the registry's lifetime.

use crate::api::{HttpComputeClient, HttpStackClient};
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Resolved remote credentials; also the registry's identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key identifier
    pub access_key_id: String,
    /// Secret key
    pub secret_key: String,
    /// Provider region the clients talk to
    pub region: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Logical service kinds the registry can hand out clients for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Stack orchestration service
    Orchestration,
    /// Compute (instance) service
    Compute,
}

impl FromStr for ServiceKind {
    type Err = String;

    /// Parse a service name, normalizing legacy aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orchestration" | "stacks" => Ok(Self::Orchestration),
            // Historical alias kept for old configs
            "compute" | "ec2" => Ok(Self::Compute),
            other => Err(format!("unknown service kind: {other}")),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orchestration => f.write_str("orchestration"),
            Self::Compute => f.write_str("compute"),
        }
    }
}

/// A memoized client handle returned by [`ConnectionRegistry::get`].
#[derive(Clone)]
pub enum ClientHandle {
    /// Handle to the stack orchestration client
    Orchestration(Rc<HttpStackClient>),
    /// Handle to the compute client
    Compute(Rc<HttpComputeClient>),
}

/// Lazily creates and memoizes one client per logical service.
pub struct ConnectionRegistry {
    credentials: Credentials,
    orchestration_endpoint: Option<String>,
    orchestration: OnceCell<Rc<HttpStackClient>>,
    compute: OnceCell<Rc<HttpComputeClient>>,
}

impl ConnectionRegistry {
    /// Create a registry for one credential set.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            orchestration_endpoint: None,
            orchestration: OnceCell::new(),
            compute: OnceCell::new(),
        }
    }

    /// Override the orchestration endpoint (private deployments, tests).
    #[must_use]
    pub fn with_orchestration_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.orchestration_endpoint = Some(endpoint.into());
        self
    }

    /// The credentials this registry was constructed with.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The memoized handle for a service kind, building it on first request.
    #[must_use]
    pub fn get(&self, kind: ServiceKind) -> ClientHandle {
        match kind {
            ServiceKind::Orchestration => ClientHandle::Orchestration(self.orchestration()),
            ServiceKind::Compute => ClientHandle::Compute(self.compute()),
        }
    }

    /// The memoized orchestration client.
    #[must_use]
    pub fn orchestration(&self) -> Rc<HttpStackClient> {
        Rc::clone(self.orchestration.get_or_init(|| {
            log::debug!("building orchestration client for {}", self.credentials.region);
            Rc::new(match &self.orchestration_endpoint {
                Some(endpoint) => {
                    HttpStackClient::with_endpoint(self.credentials.clone(), endpoint.clone())
                }
                None => HttpStackClient::new(self.credentials.clone()),
            })
        }))
    }

    /// The memoized compute client.
    #[must_use]
    pub fn compute(&self) -> Rc<HttpComputeClient> {
        Rc::clone(self.compute.get_or_init(|| {
            log::debug!("building compute client for {}", self.credentials.region);
            Rc::new(HttpComputeClient::new(self.credentials.clone()))
        }))
    }
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
    fn test_repeated_get_returns_cached_handle() {
        let registry = ConnectionRegistry::new(credentials());
        let first = registry.orchestration();
        let second = registry.orchestration();
        assert!(Rc::ptr_eq(&first, &second));

        let first = registry.compute();
        let second = registry.compute();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_legacy_alias_maps_to_compute() {
        assert_eq!("ec2".parse::<ServiceKind>().unwrap(), ServiceKind::Compute);
        assert_eq!(
            "compute".parse::<ServiceKind>().unwrap(),
            ServiceKind::Compute
        );
        assert!("s3".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn test_alias_and_canonical_share_a_handle() {
        let registry = ConnectionRegistry::new(credentials());
        let via_alias = registry.get("ec2".parse().unwrap());
        let via_kind = registry.get(ServiceKind::Compute);
        match (via_alias, via_kind) {
            (ClientHandle::Compute(a), ClientHandle::Compute(b)) => {
                assert!(Rc::ptr_eq(&a, &b));
            }
            _ => panic!("expected compute handles"),
        }
    }

    #[test]
    fn test_endpoint_override_applies_to_orchestration() {
        let registry =
            ConnectionRegistry::new(credentials()).with_orchestration_endpoint("http://localhost:4569");
        assert_eq!(registry.orchestration().endpoint(), "http://localhost:4569");
        // Compute still derives its default from the region
        assert_eq!(
            registry.compute().endpoint(),
            "https://compute.us-east-1.stratus.cloud"
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            secret_key: "hunter2".to_string(),
            ..credentials()
        };
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
