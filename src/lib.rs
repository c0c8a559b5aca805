//! Athanor SDK
//!
//! This crate is the Rust toolkit for the Athanor infrastructure tool. It
//! covers both sides of the provider boundary:
//!
//! - **Consumers** describe desired infrastructure as a [`Blueprint`] of
//!   [`Expr`] statements and write it out for the host.
//! - **Providers** publish a [`Schema`] and serve resource lifecycle
//!   operations over gRPC through a [`ProviderService`].
//!
//! # Overview
//!
//! - **Value model** ([`value`]): the concrete data exchanged at runtime
//! - **Expression algebra** ([`expr`]): the symbolic language blueprints are
//!   written in, including references to other resources' attributes
//! - **Blueprints** ([`blueprint`]): ordered statements with alias checks
//! - **Lifecycle protocol** ([`server`], [`mask`]): get, create, update with
//!   a field mask, and delete, dispatched by resource type
//! - **Schemas** ([`schema`], [`validation`]): struct definitions, type
//!   collection for code generation, and value validation
//! - **Translator boundary** ([`translator`], [`codec`]): running blueprint
//!   and schema programs and writing their output
//! - **Testing** ([`testing`]): an in-process harness over the wire format
//!
//! # Quick Start
//!
//! ```no_run
//! use athanor_sdk::schema::{FieldSchema, ResourceSchema, Schema, StructSchema};
//! use athanor_sdk::value::{Identifier, Value};
//! use athanor_sdk::{async_trait, serve, ProviderError, ProviderService, Resource, ResourceHandler};
//!
//! struct Bucket;
//!
//! #[async_trait]
//! impl ResourceHandler for Bucket {
//!     async fn create(
//!         &self,
//!         identifier: &Identifier,
//!         config: &Value,
//!     ) -> Result<Resource, ProviderError> {
//!         Ok(Resource::new(identifier.clone(), config.clone(), Value::Nil))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ProviderError> {
//!     let schema = Schema::new("storage", "0.1.0").with_resource(ResourceSchema::new(
//!         "bucket",
//!         StructSchema::new("identifier")
//!             .with_field("name", FieldSchema::String)
//!             .as_identifier(),
//!         StructSchema::new("config").with_field("expiration", FieldSchema::String),
//!         StructSchema::new("attrs"),
//!     ));
//!
//!     serve(ProviderService::new(schema).with_handler("bucket", Bucket)).await
//! }
//! ```
//!
//! # Handshake Protocol
//!
//! A provider started via [`serve`] prints one line to stdout:
//!
//! ```text
//! ATHANOR_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `ATHANOR_PROVIDER|<protocol_version>|<address>`
//!
//! The host spawns the provider with `ATHANOR_PLUGIN_COOKIE` set, reads the
//! line and connects over gRPC.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blueprint;
pub mod codec;
pub mod error;
pub mod expr;
pub mod logging;
pub mod mask;
pub mod schema;
pub mod server;
pub mod testing;
pub mod translator;
pub mod types;
pub mod validation;
pub mod value;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

// Re-export main types at crate root
pub use blueprint::{Blueprint, BuildStmt, Source, Stmt, TranslatorRef};
pub use error::ProviderError;
pub use expr::{Expr, ProviderExpr, ResourceExpr, ResourceIdentifierExpr, ToExpr};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use mask::{apply_mask, compute_mask, Operation, UpdateMaskField};
pub use schema::{FieldSchema, ResourceSchema, Schema, StructSchema};
pub use server::{
    serve, serve_on, serve_on_listener, serve_on_with_options, serve_with_options,
    ProviderService, ResourceHandler, ServeOptions,
};
pub use translator::{LocalTranslator, TranslatorService};
pub use types::{HandshakeConfig, Resource, HANDSHAKE_PREFIX, PROTOCOL_VERSION};
pub use validation::{is_valid, validate, validate_result};
pub use value::{File, FromValue, Identifier, ToValue, Value};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tonic;
pub use tracing;
