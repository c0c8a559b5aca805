//! File I/O around blueprint and schema construction.
//!
//! Consumer and schema programs are plain functions that return a
//! [`Blueprint`] or a [`Schema`]. This module is the thin caller that feeds
//! them their configuration and writes the result where the translator
//! asked for it.
//!
//! Blueprint configuration is a JSON array of expressions. Blueprints and
//! schemas are written as protobuf binary.

use std::fs;
use std::path::Path;

use prost::Message;
use tracing::{debug, info};

use crate::blueprint::Blueprint;
use crate::error::ProviderError;
use crate::expr::Expr;
use crate::generated;
use crate::schema::Schema;

/// Read the positional config expressions for a blueprint build.
pub fn read_config_exprs(path: impl AsRef<Path>) -> Result<Vec<Expr>, ProviderError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let exprs: Vec<Expr> = serde_json::from_slice(&data)?;
    debug!(path = %path.display(), count = exprs.len(), "Read config expressions");
    Ok(exprs)
}

/// Validate a blueprint and write it as protobuf.
pub fn write_blueprint(path: impl AsRef<Path>, blueprint: &Blueprint) -> Result<(), ProviderError> {
    fs::write(path, blueprint.encode_to_vec()?)?;
    Ok(())
}

/// Read and validate a protobuf blueprint.
pub fn read_blueprint(path: impl AsRef<Path>) -> Result<Blueprint, ProviderError> {
    Blueprint::decode(&fs::read(path)?)
}

/// Write a provider schema as protobuf.
///
/// The schema's struct types are collected first, so two different structs
/// sharing a name fail here with [`ProviderError::DuplicateType`].
pub fn write_schema(path: impl AsRef<Path>, schema: &Schema) -> Result<(), ProviderError> {
    schema.struct_types()?;
    fs::write(path, schema.to_proto().encode_to_vec())?;
    Ok(())
}

/// Read a protobuf provider schema.
pub fn read_schema(path: impl AsRef<Path>) -> Result<Schema, ProviderError> {
    let proto = generated::Schema::decode(fs::read(path)?.as_slice())?;
    Schema::from_proto(proto)
}

/// Run a blueprint program: read its config, build, and write the result.
pub fn run_blueprint<F>(
    config_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    build: F,
) -> Result<Blueprint, ProviderError>
where
    F: FnOnce(Vec<Expr>) -> Result<Blueprint, ProviderError>,
{
    let config = read_config_exprs(config_path)?;
    let blueprint = build(config)?;
    write_blueprint(&output_path, &blueprint)?;
    info!(
        path = %output_path.as_ref().display(),
        stmts = blueprint.len(),
        "Wrote blueprint"
    );
    Ok(blueprint)
}

/// Run a schema program and write the result.
pub fn run_schema<F>(output_path: impl AsRef<Path>, build: F) -> Result<Schema, ProviderError>
where
    F: FnOnce() -> Result<Schema, ProviderError>,
{
    let schema = build()?;
    write_schema(&output_path, &schema)?;
    info!(
        path = %output_path.as_ref().display(),
        provider = %schema.name,
        resources = schema.resources.len(),
        "Wrote schema"
    );
    Ok(schema)
}
