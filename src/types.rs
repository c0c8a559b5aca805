//! Convenience types for provider implementations.
//!
//! These types provide a more ergonomic API over the raw protobuf types.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::generated;
use crate::value::{Identifier, Value};

/// A realised resource as returned by a provider.
///
/// `config` is the desired state supplied by the user, `attrs` is state
/// computed by the provider. A resource is never mutated after it is
/// returned; a later call produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// The identifier naming this resource.
    pub identifier: Identifier,
    /// User-supplied configuration.
    pub config: Value,
    /// Provider-computed, read-only attributes.
    pub attrs: Value,
}

impl Resource {
    /// Create a new resource.
    pub fn new(identifier: Identifier, config: Value, attrs: Value) -> Self {
        Self {
            identifier,
            config,
            attrs,
        }
    }

    /// The resource type of this resource's identifier.
    pub fn resource_type(&self) -> &str {
        &self.identifier.resource_type
    }
}

impl From<&Resource> for generated::Resource {
    fn from(resource: &Resource) -> Self {
        Self {
            identifier: Some((&resource.identifier).into()),
            config: Some((&resource.config).into()),
            attrs: Some((&resource.attrs).into()),
        }
    }
}

impl TryFrom<generated::Resource> for Resource {
    type Error = ProviderError;

    fn try_from(proto: generated::Resource) -> Result<Self, Self::Error> {
        let identifier = proto
            .identifier
            .ok_or_else(|| ProviderError::internal("resource has no identifier"))?;
        Ok(Self {
            identifier: identifier.try_into()?,
            config: proto.config.map(Value::try_from).transpose()?.unwrap_or(Value::Nil),
            attrs: proto.attrs.map(Value::try_from).transpose()?.unwrap_or(Value::Nil),
        })
    }
}

/// The protocol version for the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// The handshake prefix output by providers.
pub const HANDSHAKE_PREFIX: &str = "ATHANOR_PROVIDER";

/// Default environment variable a host sets before launching a provider.
pub const DEFAULT_MAGIC_COOKIE_KEY: &str = "ATHANOR_PLUGIN_COOKIE";

/// Default value of the magic cookie.
pub const DEFAULT_MAGIC_COOKIE_VALUE: &str = "athanor";

/// Handshake settings shared by a host and the providers it launches.
///
/// The magic cookie is a guard against running a provider binary directly:
/// the host exports the cookie into the child's environment and the provider
/// refuses to serve without it. It is not a security mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeConfig {
    /// Protocol version announced on the handshake line.
    pub protocol_version: u32,
    /// Environment variable holding the cookie.
    pub magic_cookie_key: String,
    /// Expected cookie value.
    pub magic_cookie_value: String,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            magic_cookie_key: DEFAULT_MAGIC_COOKIE_KEY.to_string(),
            magic_cookie_value: DEFAULT_MAGIC_COOKIE_VALUE.to_string(),
        }
    }
}

impl HandshakeConfig {
    /// Create a handshake config with a custom cookie.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            magic_cookie_key: key.into(),
            magic_cookie_value: value.into(),
            ..Default::default()
        }
    }

    /// Check a cookie value read from the environment.
    pub fn verify(&self, cookie: Option<&str>) -> Result<(), ProviderError> {
        match cookie {
            Some(value) if value == self.magic_cookie_value => Ok(()),
            _ => Err(ProviderError::internal(format!(
                "this binary is a provider plugin and must be launched by its host \
                 (environment variable {} is missing or wrong)",
                self.magic_cookie_key
            ))),
        }
    }

    /// Check the magic cookie in the current process environment.
    pub fn verify_env(&self) -> Result<(), ProviderError> {
        let cookie = std::env::var(&self.magic_cookie_key).ok();
        self.verify(cookie.as_deref())
    }

    /// The line written to stdout once the server is listening.
    ///
    /// Format: `ATHANOR_PROVIDER|<protocol_version>|<address>`
    pub fn handshake_line(&self, addr: &std::net::SocketAddr) -> String {
        format!("{}|{}|{}", HANDSHAKE_PREFIX, self.protocol_version, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_conversion() {
        let resource = Resource::new(
            Identifier::new("bucket", Value::map([("name", "x")])),
            Value::map([("expiration", "12h")]),
            Value::map([("bar", Value::map([("foo", "hi")]))]),
        );

        let proto: generated::Resource = (&resource).into();
        let back = Resource::try_from(proto).unwrap();
        assert_eq!(back, resource);
        assert_eq!(back.resource_type(), "bucket");
    }

    #[test]
    fn test_resource_without_identifier_is_rejected() {
        let proto = generated::Resource {
            identifier: None,
            config: None,
            attrs: None,
        };
        assert!(matches!(
            Resource::try_from(proto),
            Err(ProviderError::Internal(_))
        ));
    }

    #[test]
    fn test_handshake_line() {
        let config = HandshakeConfig::default();
        let addr: std::net::SocketAddr = "127.0.0.1:50051".parse().unwrap();
        assert_eq!(
            config.handshake_line(&addr),
            "ATHANOR_PROVIDER|1|127.0.0.1:50051"
        );
    }

    #[test]
    fn test_magic_cookie() {
        let config = HandshakeConfig::new("COOKIE", "hi");
        assert!(config.verify(Some("hi")).is_ok());

        let err = config.verify(Some("nope")).unwrap_err();
        assert!(err.to_string().contains("COOKIE"));
        assert!(config.verify(None).is_err());
    }

    #[test]
    fn test_protocol_constants() {
        assert_eq!(PROTOCOL_VERSION, 1);
        assert_eq!(HANDSHAKE_PREFIX, "ATHANOR_PROVIDER");
    }
}
