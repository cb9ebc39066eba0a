//! JSON Schema validation for catalog documents.
//!
//! The schema rides along in the binary so external catalogs are checked
//! against the exact contract this build understands, not whatever copy
//! happens to be on disk.

use anyhow::{Context, Result, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

const CATALOG_SCHEMA_JSON: &str = include_str!("../../schema/image_catalog.schema.json");

/// Validate a raw catalog document against the embedded schema.
///
/// Reports every violation, not just the first; schema errors in a catalog
/// usually come in clusters.
pub fn validate_catalog_document(document: &Value) -> Result<()> {
    let compiled = compile_embedded_schema()?;
    if let Err(errors) = compiled.validate(document) {
        let details = errors
            .map(|err| format!("{} (at {})", err, err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("catalog failed schema validation:\n{details}");
    }
    Ok(())
}

fn compile_embedded_schema() -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(CATALOG_SCHEMA_JSON).context("parsing embedded catalog schema")?;
    // The compiled validator borrows the schema for 'static; the embedded
    // document is tiny, so leaking one copy per compile is acceptable.
    let schema: &'static Value = Box::leak(Box::new(schema));
    JSONSchema::compile(schema).context("compiling embedded catalog schema")
}
