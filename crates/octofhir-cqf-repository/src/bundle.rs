//! Bundle helpers

use crate::error::RepositoryError;
use crate::Resource;
use serde_json::Value;

pub fn resource_type(resource: &Value) -> Option<&str> {
    resource.get("resourceType").and_then(Value::as_str)
}

pub fn resource_id(resource: &Value) -> Option<&str> {
    resource.get("id").and_then(Value::as_str)
}

/// The resources carried by `bundle.entry[].resource`, in entry order.
///
/// Entries without a resource (e.g. delete entries of a transaction) are skipped.
pub fn bundle_resources(bundle: &Value) -> Result<Vec<Resource>, RepositoryError> {
    match resource_type(bundle) {
        Some("Bundle") => {}
        other => {
            return Err(RepositoryError::InvalidBundle {
                message: format!("expected a Bundle, found {}", other.unwrap_or("no resourceType")),
            });
        }
    }

    let entries = match bundle.get("entry") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(RepositoryError::InvalidBundle {
                message: "entry must be an array".to_string(),
            });
        }
    };

    Ok(entries
        .iter()
        .filter_map(|entry| entry.get("resource"))
        .cloned()
        .collect())
}

pub fn resources_of_type<'a>(
    resources: &'a [Resource],
    wanted: &'a str,
) -> impl Iterator<Item = &'a Resource> + 'a {
    resources
        .iter()
        .filter(move |resource| resource_type(resource) == Some(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bundle_resources_in_entry_order() {
        let bundle = json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "a"}},
                {"request": {"method": "DELETE", "url": "Patient/x"}},
                {"resource": {"resourceType": "Condition", "id": "b"}}
            ]
        });

        let resources = bundle_resources(&bundle).unwrap();
        let ids: Vec<_> = resources.iter().filter_map(resource_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(resources_of_type(&resources, "Condition").count(), 1);
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = json!({"resourceType": "Bundle"});
        assert!(bundle_resources(&bundle).unwrap().is_empty());
    }

    #[test]
    fn test_non_bundle_is_rejected() {
        let err = bundle_resources(&json!({"resourceType": "Patient"})).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidBundle { .. }));
        assert_eq!(err.code().to_string(), "CQF0301");
    }
}
