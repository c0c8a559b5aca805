//! Resource lifecycle dispatch and the provider gRPC server.
//!
//! A provider registers one [`ResourceHandler`] per resource type on a
//! [`ProviderService`], then hands the service to [`serve`]. Every inbound
//! identifier is routed by its resource type; a type with no handler is a
//! not-found error, distinct from a handler reporting that one instance
//! does not exist.
//!
//! # Signal Handling
//!
//! The server handles SIGTERM and SIGINT. When a signal is received, the
//! server:
//! 1. Stops accepting new connections
//! 2. Waits for in-flight requests to complete (with configurable timeout)
//! 3. Exits cleanly

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tonic::transport::Server;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::generated;
use crate::mask::{self, UpdateMaskField};
use crate::schema::Schema;
use crate::types::{HandshakeConfig, Resource};
use crate::validation;
use crate::value::{Identifier, Value};

/// CRUD operations for one resource type.
///
/// Every method has a default that fails with an internal error, so a
/// handler only implements the verbs its resource supports. A handler that
/// cannot find the instance it was asked about should return
/// [`ProviderError::NotFound`]; the server reports that distinctly from any
/// other failure.
///
/// Handlers may be called concurrently, including for the same identifier.
/// A handler that needs read-modify-write atomicity must provide its own
/// locking.
///
/// # Example
///
/// ```
/// use athanor_sdk::{async_trait, ProviderError, Resource, ResourceHandler};
/// use athanor_sdk::value::{Identifier, Value};
///
/// struct Bucket;
///
/// #[async_trait]
/// impl ResourceHandler for Bucket {
///     async fn get(&self, identifier: &Identifier) -> Result<Resource, ProviderError> {
///         Err(ProviderError::not_found(format!("no bucket {:?}", identifier.value)))
///     }
/// }
/// ```
#[async_trait]
pub trait ResourceHandler: Send + Sync + 'static {
    /// Read the current state of a resource.
    async fn get(&self, identifier: &Identifier) -> Result<Resource, ProviderError> {
        let _ = identifier;
        Err(ProviderError::internal(
            "get is not implemented for this resource type",
        ))
    }

    /// Create a resource from its config.
    async fn create(
        &self,
        identifier: &Identifier,
        config: &Value,
    ) -> Result<Resource, ProviderError> {
        let _ = (identifier, config);
        Err(ProviderError::internal(
            "create is not implemented for this resource type",
        ))
    }

    /// Update a resource.
    ///
    /// `mask` lists the config fields that changed. Fields outside the mask
    /// should be left as they are; [`mask::apply_mask`] does the merge.
    async fn update(
        &self,
        identifier: &Identifier,
        config: &Value,
        mask: &[UpdateMaskField],
    ) -> Result<Resource, ProviderError> {
        let _ = (identifier, config, mask);
        Err(ProviderError::internal(
            "update is not implemented for this resource type",
        ))
    }

    /// Delete a resource. Deleting an absent resource should succeed.
    async fn delete(&self, identifier: &Identifier) -> Result<(), ProviderError> {
        let _ = identifier;
        Err(ProviderError::internal(
            "delete is not implemented for this resource type",
        ))
    }
}

/// A provider: its schema and a handler per resource type.
///
/// The registry is built once before serving and is read-only afterwards.
pub struct ProviderService {
    schema: Schema,
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
}

impl ProviderService {
    /// Create a provider with no handlers.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for a resource type.
    pub fn with_handler(
        mut self,
        resource_type: impl Into<String>,
        handler: impl ResourceHandler,
    ) -> Self {
        self.handlers.insert(resource_type.into(), Arc::new(handler));
        self
    }

    /// The provider schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Registered resource types, sorted.
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Whether a handler is registered for `resource_type`.
    pub fn has_handler(&self, resource_type: &str) -> bool {
        self.handlers.contains_key(resource_type)
    }

    fn handler(&self, identifier: &Identifier) -> Result<&dyn ResourceHandler, ProviderError> {
        self.handlers
            .get(&identifier.resource_type)
            .map(|h| &**h)
            .ok_or_else(|| ProviderError::UnknownResourceType(identifier.resource_type.clone()))
    }

    fn validate(&self, identifier: &Identifier, config: &Value) -> Result<(), ProviderError> {
        match self.schema.resource(&identifier.resource_type) {
            Some(schema) => validation::validate_resource(schema, &identifier.value, config),
            None => Ok(()),
        }
    }

    /// Read a resource.
    pub async fn get_resource(&self, identifier: &Identifier) -> Result<Resource, ProviderError> {
        self.handler(identifier)?.get(identifier).await
    }

    /// Validate the config and create a resource.
    pub async fn create_resource(
        &self,
        identifier: &Identifier,
        config: &Value,
    ) -> Result<Resource, ProviderError> {
        let handler = self.handler(identifier)?;
        self.validate(identifier, config)?;
        handler.create(identifier, config).await
    }

    /// Validate the config, reject updates to immutable fields, and update a
    /// resource.
    pub async fn update_resource(
        &self,
        identifier: &Identifier,
        config: &Value,
        mask: &[UpdateMaskField],
    ) -> Result<Resource, ProviderError> {
        let handler = self.handler(identifier)?;
        self.validate(identifier, config)?;
        mask::check_immutable(config, mask)?;
        handler.update(identifier, config, mask).await
    }

    /// Delete a resource.
    pub async fn delete_resource(&self, identifier: &Identifier) -> Result<(), ProviderError> {
        self.handler(identifier)?.delete(identifier).await
    }
}

/// Wrapper that implements the generated gRPC trait.
pub(crate) struct ProviderGrpcService {
    pub(crate) service: Arc<ProviderService>,
}

impl ProviderGrpcService {
    /// Route by the raw resource type before the identifier value is decoded.
    fn required_identifier(
        &self,
        operation: &str,
        identifier: Option<generated::Identifier>,
    ) -> Result<Identifier, tonic::Status> {
        let identifier =
            identifier.ok_or_else(|| tonic::Status::internal("request has no identifier"))?;
        if !self.service.has_handler(&identifier.r#type) {
            let resource_type = identifier.r#type;
            return Err(failed(
                operation,
                &resource_type,
                ProviderError::UnknownResourceType(resource_type.clone()),
            ));
        }
        Identifier::try_from(identifier).map_err(Into::into)
    }
}

fn optional_value(value: Option<generated::Value>) -> Result<Value, tonic::Status> {
    value
        .map(Value::try_from)
        .transpose()
        .map(|v| v.unwrap_or(Value::Nil))
        .map_err(Into::into)
}

fn failed(operation: &str, resource_type: &str, err: ProviderError) -> tonic::Status {
    if err.is_not_found() {
        debug!(resource_type = %resource_type, error = %err, "{} found nothing", operation);
    } else {
        error!(resource_type = %resource_type, error = %err, "{} failed", operation);
    }
    err.into()
}

#[tonic::async_trait]
impl generated::provider_server::Provider for ProviderGrpcService {
    #[instrument(skip(self, _request), name = "grpc.get_schema")]
    async fn get_schema(
        &self,
        _request: tonic::Request<generated::GetSchemaRequest>,
    ) -> Result<tonic::Response<generated::GetSchemaResponse>, tonic::Status> {
        debug!("GetSchema called");
        let schema = self.service.schema();
        info!(
            provider = %schema.name,
            resources = schema.resources.len(),
            "GetSchema completed"
        );
        Ok(tonic::Response::new(generated::GetSchemaResponse {
            schema: Some(schema.to_proto()),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.get_resource")]
    async fn get_resource(
        &self,
        request: tonic::Request<generated::GetResourceRequest>,
    ) -> Result<tonic::Response<generated::GetResourceResponse>, tonic::Status> {
        let req = request.into_inner();
        let identifier = self.required_identifier("GetResource", req.identifier)?;
        debug!(resource_type = %identifier.resource_type, "GetResource called");

        let resource = self
            .service
            .get_resource(&identifier)
            .await
            .map_err(|e| failed("GetResource", &identifier.resource_type, e))?;

        debug!(resource_type = %identifier.resource_type, "GetResource completed");
        Ok(tonic::Response::new(generated::GetResourceResponse {
            resource: Some((&resource).into()),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.create_resource")]
    async fn create_resource(
        &self,
        request: tonic::Request<generated::CreateResourceRequest>,
    ) -> Result<tonic::Response<generated::CreateResourceResponse>, tonic::Status> {
        let req = request.into_inner();
        let identifier = self.required_identifier("CreateResource", req.identifier)?;
        let config = optional_value(req.config)?;
        info!(resource_type = %identifier.resource_type, "CreateResource called");

        let resource = self
            .service
            .create_resource(&identifier, &config)
            .await
            .map_err(|e| failed("CreateResource", &identifier.resource_type, e))?;

        info!(resource_type = %identifier.resource_type, "CreateResource completed");
        Ok(tonic::Response::new(generated::CreateResourceResponse {
            resource: Some((&resource).into()),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.update_resource")]
    async fn update_resource(
        &self,
        request: tonic::Request<generated::UpdateResourceRequest>,
    ) -> Result<tonic::Response<generated::UpdateResourceResponse>, tonic::Status> {
        let req = request.into_inner();
        let identifier = self.required_identifier("UpdateResource", req.identifier)?;
        let config = optional_value(req.config)?;
        let mask = mask::mask_from_proto(req.mask)?;
        info!(
            resource_type = %identifier.resource_type,
            mask_fields = mask.len(),
            "UpdateResource called"
        );

        let resource = self
            .service
            .update_resource(&identifier, &config, &mask)
            .await
            .map_err(|e| failed("UpdateResource", &identifier.resource_type, e))?;

        info!(resource_type = %identifier.resource_type, "UpdateResource completed");
        Ok(tonic::Response::new(generated::UpdateResourceResponse {
            resource: Some((&resource).into()),
        }))
    }

    #[instrument(skip(self, request), name = "grpc.delete_resource")]
    async fn delete_resource(
        &self,
        request: tonic::Request<generated::DeleteResourceRequest>,
    ) -> Result<tonic::Response<generated::DeleteResourceResponse>, tonic::Status> {
        let req = request.into_inner();
        let identifier = self.required_identifier("DeleteResource", req.identifier)?;
        info!(resource_type = %identifier.resource_type, "DeleteResource called");

        self.service
            .delete_resource(&identifier)
            .await
            .map_err(|e| failed("DeleteResource", &identifier.resource_type, e))?;

        info!(resource_type = %identifier.resource_type, "DeleteResource completed");
        Ok(tonic::Response::new(generated::DeleteResourceResponse {}))
    }
}

/// Options for configuring the provider server.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Timeout for graceful shutdown. After receiving a shutdown signal,
    /// the server will wait this long for in-flight requests to complete.
    /// Default: 30 seconds.
    pub shutdown_timeout: Duration,
    /// Upper bound on a single call. A call that runs longer is cancelled
    /// and its handler future dropped. Default: none.
    pub request_timeout: Option<Duration>,
    /// Handshake settings. Default: [`HandshakeConfig::default`].
    pub handshake: HandshakeConfig,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
            request_timeout: None,
            handshake: HandshakeConfig::default(),
        }
    }
}

impl ServeOptions {
    /// Create new serve options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Bound every call by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Use custom handshake settings.
    pub fn with_handshake(mut self, handshake: HandshakeConfig) -> Self {
        self.handshake = handshake;
        self
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// On Unix, this waits for SIGTERM or SIGINT.
/// On Windows, this waits for CTRL+C.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to install signal handlers");
                return std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C handler");
            return std::future::pending::<()>().await;
        }
        info!("Received CTRL+C, initiating graceful shutdown");
    }

    #[cfg(not(any(unix, windows)))]
    {
        std::future::pending::<()>().await;
    }
}

/// Serve a provider as a gRPC server.
///
/// This function:
/// 1. Checks the magic cookie set by the host
/// 2. Binds an available port on localhost
/// 3. Outputs the handshake line to stdout
/// 4. Handles shutdown signals (SIGTERM/SIGINT) gracefully
///
/// The handshake format is: `ATHANOR_PROVIDER|<version>|<address>`
///
/// For custom configuration, use [`serve_with_options`].
pub async fn serve(provider: ProviderService) -> Result<(), ProviderError> {
    serve_with_options(provider, ServeOptions::default()).await
}

/// Serve a provider with custom options.
pub async fn serve_with_options(
    provider: ProviderService,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    options.handshake.verify_env()?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    serve_on_listener(provider, listener, options).await
}

/// Serve a provider on a specific address.
///
/// Unlike [`serve`], this binds the given address and does not check the
/// magic cookie, which makes it suitable for running a provider by hand.
pub async fn serve_on(provider: ProviderService, addr: SocketAddr) -> Result<(), ProviderError> {
    serve_on_with_options(provider, addr, ServeOptions::default()).await
}

/// Serve a provider on a specific address with custom options.
pub async fn serve_on_with_options(
    provider: ProviderService,
    addr: SocketAddr,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    let listener = TcpListener::bind(addr).await?;
    serve_on_listener(provider, listener, options).await
}

/// Serve on an already-bound listener until a shutdown signal arrives.
pub async fn serve_on_listener(
    provider: ProviderService,
    listener: TcpListener,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    let addr = listener.local_addr()?;
    println!("{}", options.handshake.handshake_line(&addr));

    info!(
        address = %addr,
        resource_types = ?provider.resource_types(),
        "Provider server starting"
    );

    let service = ProviderGrpcService {
        service: Arc::new(provider),
    };
    let server = generated::provider_server::ProviderServer::new(service);

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown = async move {
        wait_for_shutdown_signal().await;
        let _ = signalled_tx.send(());
    };

    let mut builder = Server::builder();
    if let Some(timeout) = options.request_timeout {
        builder = builder.timeout(timeout);
    }
    let server_future = builder.add_service(server).serve_with_incoming_shutdown(
        tokio_stream::wrappers::TcpListenerStream::new(listener),
        shutdown,
    );
    tokio::pin!(server_future);

    tokio::select! {
        result = &mut server_future => {
            if let Err(e) = result {
                error!(error = %e, "Server error");
                return Err(e.into());
            }
        }
        Ok(()) = signalled_rx => {
            // The signal is in; bound how long in-flight calls may drain.
            match tokio::time::timeout(options.shutdown_timeout, &mut server_future).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %e, "Server error during shutdown");
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(
                        timeout = ?options.shutdown_timeout,
                        "Shutdown timeout exceeded, forcing shutdown"
                    );
                }
            }
        }
    }

    info!("Provider shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::UpdateMaskField;
    use crate::schema::{FieldSchema, ResourceSchema, StructSchema};

    struct Missing;

    #[async_trait]
    impl ResourceHandler for Missing {
        async fn get(&self, identifier: &Identifier) -> Result<Resource, ProviderError> {
            Err(ProviderError::not_found(format!(
                "no {} instance",
                identifier.resource_type
            )))
        }

        async fn create(
            &self,
            identifier: &Identifier,
            config: &Value,
        ) -> Result<Resource, ProviderError> {
            Ok(Resource::new(identifier.clone(), config.clone(), Value::Nil))
        }

        async fn update(
            &self,
            identifier: &Identifier,
            config: &Value,
            _mask: &[UpdateMaskField],
        ) -> Result<Resource, ProviderError> {
            Ok(Resource::new(identifier.clone(), config.clone(), Value::Nil))
        }
    }

    struct Broken;

    #[async_trait]
    impl ResourceHandler for Broken {
        async fn get(&self, _identifier: &Identifier) -> Result<Resource, ProviderError> {
            Err(ProviderError::internal("backend unavailable"))
        }
    }

    fn service() -> ProviderService {
        let schema = Schema::new("storage", "0.1.0").with_resource(ResourceSchema::new(
            "bucket",
            StructSchema::new("identifier")
                .with_field("name", FieldSchema::String)
                .as_identifier(),
            StructSchema::new("config")
                .with_field("region", FieldSchema::String)
                .with_field("expiration", FieldSchema::String),
            FieldSchema::map(FieldSchema::String),
        ));

        ProviderService::new(schema)
            .with_handler("bucket", Missing)
            .with_handler("queue", Broken)
    }

    fn bucket() -> Identifier {
        Identifier::new("bucket", Value::map([("name", "x")]))
    }

    #[test]
    fn test_serve_options_builder() {
        let options = ServeOptions::new()
            .with_shutdown_timeout(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(1))
            .with_handshake(HandshakeConfig::new("COOKIE", "hi"));

        assert_eq!(options.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(options.request_timeout, Some(Duration::from_secs(1)));
        assert_eq!(options.handshake.magic_cookie_key, "COOKIE");

        let defaults = ServeOptions::default();
        assert_eq!(defaults.shutdown_timeout, Duration::from_secs(30));
        assert!(defaults.request_timeout.is_none());
    }

    #[test]
    fn test_resource_types_are_sorted() {
        assert_eq!(service().resource_types(), vec!["bucket", "queue"]);
        assert!(service().has_handler("bucket"));
        assert!(!service().has_handler("table"));
    }

    #[tokio::test]
    async fn test_unknown_type_is_not_found() {
        let err = service()
            .get_resource(&Identifier::new("table", "t"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(ref t) if t == "table"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_handler_errors_are_classified() {
        let service = service();

        let err = service.get_resource(&bucket()).await.unwrap_err();
        assert_eq!(tonic::Status::from(err).code(), tonic::Code::NotFound);

        let err = service
            .get_resource(&Identifier::new("queue", "q"))
            .await
            .unwrap_err();
        assert_eq!(tonic::Status::from(err).code(), tonic::Code::Internal);

        let err = service
            .delete_resource(&Identifier::new("queue", "q"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not implemented"));
    }

    #[tokio::test]
    async fn test_create_validates_against_schema() {
        let service = service();
        let config = Value::map([("region", "us-east-1"), ("expiration", "12h")]);
        let resource = service.create_resource(&bucket(), &config).await.unwrap();
        assert_eq!(resource.config, config);

        let bad = Value::map([("region", "us-east-1"), ("colour", "red")]);
        let err = service.create_resource(&bucket(), &bad).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert_eq!(tonic::Status::from(err).code(), tonic::Code::Internal);
    }

    #[tokio::test]
    async fn test_update_rejects_immutable_fields() {
        let service = service();
        let config = Value::map([
            ("region", Value::immutable("us-east-1")),
            ("expiration", Value::from("12h")),
        ]);

        assert!(service
            .update_resource(&bucket(), &config, &[UpdateMaskField::update("expiration")])
            .await
            .is_ok());

        let err = service
            .update_resource(&bucket(), &config, &[UpdateMaskField::update("region")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("immutable"));
    }
}
