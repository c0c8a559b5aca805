//! Testing utilities for provider implementations.
//!
//! [`ProviderTester`] drives a [`ProviderService`] through the same path a
//! real host uses: every request is encoded to protobuf, decoded, handed to
//! the gRPC service, and the response is encoded and decoded again. No
//! socket is opened. [`InMemoryHandler`] is a ready-made handler that keeps
//! resources in memory and honours update masks.
//!
//! # Example
//!
//! ```
//! use athanor_sdk::schema::Schema;
//! use athanor_sdk::testing::{InMemoryHandler, ProviderTester};
//! use athanor_sdk::value::{Identifier, Value};
//! use athanor_sdk::ProviderService;
//!
//! # tokio_test::block_on(async {
//! let service = ProviderService::new(Schema::new("storage", "0.1.0"))
//!     .with_handler("bucket", InMemoryHandler::new());
//! let tester = ProviderTester::new(service);
//!
//! let id = Identifier::new("bucket", Value::map([("name", "x")]));
//! tester.create(&id, &Value::map([("expiration", "12h")])).await.unwrap();
//! assert_eq!(tester.get(&id).await.unwrap().config, Value::map([("expiration", "12h")]));
//! # });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use prost::Message;
use tokio::sync::RwLock;
use tonic::{Request, Status};

use crate::error::ProviderError;
use crate::generated;
use crate::generated::provider_server::Provider;
use crate::mask::{self, UpdateMaskField};
use crate::schema::Schema;
use crate::server::{ProviderGrpcService, ProviderService, ResourceHandler};
use crate::types::Resource;
use crate::value::{Identifier, Value};

/// Round-trip a message through its protobuf encoding.
fn through_wire<M: Message + Default>(message: &M) -> Result<M, Status> {
    M::decode(message.encode_to_vec().as_slice())
        .map_err(|e| Status::internal(format!("decode failed: {}", e)))
}

fn resource_from(resource: Option<generated::Resource>) -> Result<Resource, Status> {
    let resource = resource.ok_or_else(|| Status::internal("response has no resource"))?;
    Resource::try_from(resource).map_err(Into::into)
}

/// A test harness that calls a provider through the wire format.
///
/// Errors come back as [`tonic::Status`], exactly as a host would see them.
pub struct ProviderTester {
    grpc: ProviderGrpcService,
}

impl ProviderTester {
    /// Create a tester for the given provider.
    pub fn new(service: ProviderService) -> Self {
        Self {
            grpc: ProviderGrpcService {
                service: Arc::new(service),
            },
        }
    }

    /// The provider under test.
    pub fn service(&self) -> &ProviderService {
        &self.grpc.service
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Fetch the provider schema.
    pub async fn schema(&self) -> Result<Schema, Status> {
        let request = through_wire(&generated::GetSchemaRequest {})?;
        let response = self.grpc.get_schema(Request::new(request)).await?;
        let schema = through_wire(response.get_ref())?
            .schema
            .ok_or_else(|| Status::internal("response has no schema"))?;
        Schema::from_proto(schema).map_err(Into::into)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Read a resource.
    pub async fn get(&self, identifier: &Identifier) -> Result<Resource, Status> {
        let request = through_wire(&generated::GetResourceRequest {
            identifier: Some(identifier.into()),
        })?;
        let response = self.grpc.get_resource(Request::new(request)).await?;
        resource_from(through_wire(response.get_ref())?.resource)
    }

    /// Create a resource.
    pub async fn create(&self, identifier: &Identifier, config: &Value) -> Result<Resource, Status> {
        let request = through_wire(&generated::CreateResourceRequest {
            identifier: Some(identifier.into()),
            config: Some(config.into()),
        })?;
        let response = self.grpc.create_resource(Request::new(request)).await?;
        resource_from(through_wire(response.get_ref())?.resource)
    }

    /// Update a resource with an explicit mask.
    pub async fn update(
        &self,
        identifier: &Identifier,
        config: &Value,
        mask: &[UpdateMaskField],
    ) -> Result<Resource, Status> {
        let request = through_wire(&generated::UpdateResourceRequest {
            identifier: Some(identifier.into()),
            config: Some(config.into()),
            mask: mask::mask_to_proto(mask),
        })?;
        let response = self.grpc.update_resource(Request::new(request)).await?;
        resource_from(through_wire(response.get_ref())?.resource)
    }

    /// Update a resource, computing the mask from the old and new config.
    pub async fn update_from(
        &self,
        identifier: &Identifier,
        old: &Value,
        new: &Value,
    ) -> Result<Resource, Status> {
        let mask = mask::compute_mask(old, new)?;
        self.update(identifier, new, &mask).await
    }

    /// Delete a resource.
    pub async fn delete(&self, identifier: &Identifier) -> Result<(), Status> {
        let request = through_wire(&generated::DeleteResourceRequest {
            identifier: Some(identifier.into()),
        })?;
        let response = self.grpc.delete_resource(Request::new(request)).await?;
        through_wire(response.get_ref())?;
        Ok(())
    }
}

/// A handler that keeps resources in memory.
///
/// Creating an existing resource fails; updating applies the mask to the
/// stored config; deleting an absent resource succeeds.
#[derive(Default)]
pub struct InMemoryHandler {
    attrs: Value,
    resources: RwLock<HashMap<Vec<u8>, Resource>>,
}

impl InMemoryHandler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attrs reported for every resource this handler creates.
    pub fn with_attrs(mut self, attrs: Value) -> Self {
        self.attrs = attrs;
        self
    }

    /// Number of stored resources.
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    /// Whether no resources are stored.
    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    fn key(identifier: &Identifier) -> Vec<u8> {
        generated::Identifier::from(identifier).encode_to_vec()
    }

    fn not_found(identifier: &Identifier) -> ProviderError {
        ProviderError::not_found(format!(
            "{} {:?} does not exist",
            identifier.resource_type, identifier.value
        ))
    }
}

#[async_trait]
impl ResourceHandler for InMemoryHandler {
    async fn get(&self, identifier: &Identifier) -> Result<Resource, ProviderError> {
        self.resources
            .read()
            .await
            .get(&Self::key(identifier))
            .cloned()
            .ok_or_else(|| Self::not_found(identifier))
    }

    async fn create(
        &self,
        identifier: &Identifier,
        config: &Value,
    ) -> Result<Resource, ProviderError> {
        let mut resources = self.resources.write().await;
        let key = Self::key(identifier);
        if resources.contains_key(&key) {
            return Err(ProviderError::internal(format!(
                "{} {:?} already exists",
                identifier.resource_type, identifier.value
            )));
        }

        let resource = Resource::new(identifier.clone(), config.clone(), self.attrs.clone());
        resources.insert(key, resource.clone());
        Ok(resource)
    }

    async fn update(
        &self,
        identifier: &Identifier,
        config: &Value,
        mask: &[UpdateMaskField],
    ) -> Result<Resource, ProviderError> {
        let mut resources = self.resources.write().await;
        let current = resources
            .get_mut(&Self::key(identifier))
            .ok_or_else(|| Self::not_found(identifier))?;

        let merged = mask::apply_mask(&current.config, config, mask)?;
        *current = Resource::new(identifier.clone(), merged, current.attrs.clone());
        Ok(current.clone())
    }

    async fn delete(&self, identifier: &Identifier) -> Result<(), ProviderError> {
        self.resources.write().await.remove(&Self::key(identifier));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, ResourceSchema, StructSchema};
    use tonic::Code;

    struct Flaky;

    #[async_trait]
    impl ResourceHandler for Flaky {
        async fn get(&self, _identifier: &Identifier) -> Result<Resource, ProviderError> {
            Err(ProviderError::internal("connection reset"))
        }
    }

    fn storage_schema() -> Schema {
        Schema::new("storage", "0.1.0").with_resource(ResourceSchema::new(
            "bucket",
            StructSchema::new("identifier")
                .with_field("name", FieldSchema::String)
                .as_identifier(),
            StructSchema::new("config")
                .with_field("expiration", FieldSchema::String)
                .with_field("region", FieldSchema::String)
                .with_field(
                    "labels",
                    FieldSchema::map(FieldSchema::String),
                ),
            StructSchema::new("attrs")
                .with_field("bar", StructSchema::new("bar").with_field("foo", FieldSchema::String)),
        ))
    }

    fn tester() -> ProviderTester {
        let handler = InMemoryHandler::new()
            .with_attrs(Value::map([("bar", Value::map([("foo", "hi")]))]));
        ProviderTester::new(
            ProviderService::new(storage_schema())
                .with_handler("bucket", handler)
                .with_handler("queue", Flaky),
        )
    }

    fn bucket() -> Identifier {
        Identifier::new("bucket", Value::map([("name", "x")]))
    }

    fn config(expiration: &str) -> Value {
        Value::map([
            ("expiration", Value::from(expiration)),
            ("region", Value::immutable("us-east-1")),
            ("labels", Value::map([("team", "infra")])),
        ])
    }

    #[tokio::test]
    async fn test_schema_over_the_wire() {
        let schema = tester().schema().await.unwrap();
        assert_eq!(schema, storage_schema());
    }

    #[tokio::test]
    async fn test_bucket_lifecycle() {
        let tester = tester();

        let err = tester.get(&bucket()).await.unwrap_err();
        assert_eq!(err.code(), Code::NotFound);

        let created = tester.create(&bucket(), &config("1d")).await.unwrap();
        assert_eq!(created.identifier, bucket());
        assert_eq!(
            created.attrs.field("bar").unwrap().field("foo").unwrap().as_str().unwrap(),
            "hi"
        );

        let updated = tester
            .update_from(&bucket(), &config("1d"), &config("12h"))
            .await
            .unwrap();
        assert_eq!(updated.config, config("12h"));
        assert_eq!(tester.get(&bucket()).await.unwrap(), updated);

        tester.delete(&bucket()).await.unwrap();
        assert_eq!(tester.get(&bucket()).await.unwrap_err().code(), Code::NotFound);

        tester.delete(&bucket()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_only_touches_masked_fields() {
        let tester = tester();
        tester.create(&bucket(), &config("1d")).await.unwrap();

        let desired = Value::map([
            ("expiration", Value::from("12h")),
            ("region", Value::immutable("us-east-1")),
            ("labels", Value::map([("team", "platform")])),
        ]);
        let updated = tester
            .update(&bucket(), &desired, &[UpdateMaskField::update("expiration")])
            .await
            .unwrap();

        assert_eq!(
            updated.config.field("labels").unwrap(),
            &Value::map([("team", "infra")])
        );
        assert_eq!(updated.config.field("expiration").unwrap().as_str().unwrap(), "12h");
    }

    #[tokio::test]
    async fn test_dispatch_status_codes() {
        let tester = tester();

        let unknown = Identifier::new("table", "t");
        let err = tester.get(&unknown).await.unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
        assert!(err.message().contains("table"));

        let err = tester.get(&Identifier::new("queue", "q")).await.unwrap_err();
        assert_eq!(err.code(), Code::Internal);

        let err = tester
            .create(&Identifier::new("queue", "q"), &Value::Nil)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
        assert!(err.message().contains("not implemented"));
    }

    #[tokio::test]
    async fn test_invalid_requests_are_internal() {
        let tester = tester();

        let bad_config = Value::map([("expiration", Value::from(true))]);
        let err = tester.create(&bucket(), &bad_config).await.unwrap_err();
        assert_eq!(err.code(), Code::Internal);

        tester.create(&bucket(), &config("1d")).await.unwrap();
        let err = tester.create(&bucket(), &config("1d")).await.unwrap_err();
        assert_eq!(err.code(), Code::Internal);

        let moved = Value::map([
            ("expiration", Value::from("1d")),
            ("region", Value::immutable("eu-west-1")),
            ("labels", Value::map([("team", "infra")])),
        ]);
        let err = tester
            .update_from(&bucket(), &config("1d"), &moved)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
        assert!(err.message().contains("region"));
    }

    #[tokio::test]
    async fn test_update_of_missing_resource_is_not_found() {
        let err = tester()
            .update(&bucket(), &config("12h"), &[UpdateMaskField::update("expiration")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn test_in_memory_handler_counts() {
        let handler = InMemoryHandler::new();
        assert!(handler.is_empty().await);

        handler.create(&bucket(), &Value::Nil).await.unwrap();
        assert_eq!(handler.len().await, 1);

        handler.delete(&bucket()).await.unwrap();
        assert!(handler.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_type_is_not_found_before_value_is_decoded() {
        let tester = tester();
        let malformed = |resource_type: &str| generated::Identifier {
            r#type: resource_type.to_string(),
            value: None,
        };

        let err = tester
            .grpc
            .get_resource(Request::new(generated::GetResourceRequest {
                identifier: Some(malformed("table")),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);

        let err = tester
            .grpc
            .delete_resource(Request::new(generated::DeleteResourceRequest {
                identifier: Some(malformed("table")),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::NotFound);

        let err = tester
            .grpc
            .get_resource(Request::new(generated::GetResourceRequest {
                identifier: Some(malformed("bucket")),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
    }

    #[test]
    fn test_missing_identifier_is_rejected() {
        let tester = tester();
        let err = tokio_test::block_on(
            tester
                .grpc
                .get_resource(Request::new(generated::GetResourceRequest { identifier: None })),
        )
        .unwrap_err();
        assert_eq!(err.code(), Code::Internal);
    }
}
