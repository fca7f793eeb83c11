use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::backend::common::dtos::WorkspaceMetadata;

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

/// Reads the identity fields of a workspace metadata file.
///
/// Fields of the wrong type count as absent. A missing file, invalid JSON,
/// a non-object document, or an object with none of the fields all yield
/// `None`.
pub(crate) fn read_workspace_meta(metadata_file: &Path) -> Option<WorkspaceMetadata> {
    if !metadata_file.is_file() {
        return None;
    }

    let raw = fs::read_to_string(metadata_file).ok()?;
    let parsed = serde_json::from_str::<Value>(&raw).ok()?;
    let obj = parsed.as_object()?;

    let meta = WorkspaceMetadata {
        version: obj.get("version").and_then(|v| v.as_i64()),
        root_name: string_field(obj, "rootName"),
        created_at: string_field(obj, "createdAt"),
        updated_at: string_field(obj, "updatedAt"),
    };

    if meta.is_empty() {
        return None;
    }

    Some(meta)
}

fn field_agrees<T: PartialEq>(expected: Option<&T>, observed: Option<&T>) -> bool {
    expected.map_or(true, |wanted| observed == Some(wanted))
}

/// True when every field set on `expected` is also set on `observed` with
/// the same value. Fields left unset on `expected` are not compared.
pub(crate) fn workspace_meta_matches(
    observed: Option<&WorkspaceMetadata>,
    expected: Option<&WorkspaceMetadata>,
) -> bool {
    let (Some(observed), Some(expected)) = (observed, expected) else {
        return false;
    };

    field_agrees(expected.version.as_ref(), observed.version.as_ref())
        && field_agrees(expected.root_name.as_ref(), observed.root_name.as_ref())
        && field_agrees(expected.created_at.as_ref(), observed.created_at.as_ref())
        && field_agrees(expected.updated_at.as_ref(), observed.updated_at.as_ref())
}
