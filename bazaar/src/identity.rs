use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical value returned for an absent reference. Angle brackets never
/// occur in stored identifiers, so the sentinel cannot collide with one.
pub const MISSING_REF: &str = "<missing>";

/// A reference to a catalog entity as it arrives on the wire or sits in a
/// stored document. The catalog was populated through more than one
/// data-entry path, so the same identifier shows up as a bare string, a
/// wrapped `{"$oid": ...}` identifier, or an embedded document carrying an
/// `_id` field. Every comparison between two references must go through
/// [`same_entity`]; comparing raw shapes silently drops valid matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// Wrapped store identifier, e.g. `{"$oid": "64a1..."}`.
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
    /// Embedded document shape carrying an `_id` field.
    Doc {
        #[serde(rename = "_id")]
        id: Value,
    },
    /// Bare identifier string.
    Id(String),
}

impl EntityRef {
    /// The single normalized string form of this reference.
    pub fn canonical(&self) -> String {
        match self {
            EntityRef::Id(id) => id.clone(),
            EntityRef::Oid { oid } => oid.clone(),
            EntityRef::Doc { id } => coerce_id_value(id),
        }
    }
}

impl From<String> for EntityRef {
    fn from(id: String) -> Self {
        EntityRef::Id(id)
    }
}

impl From<&str> for EntityRef {
    fn from(id: &str) -> Self {
        EntityRef::Id(id.to_string())
    }
}

/// String coercion of an `_id` field value. A nested `{"$oid": ...}` inside
/// the document shape unwraps to the inner identifier.
fn coerce_id_value(value: &Value) -> String {
    match value {
        Value::String(id) => id.clone(),
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

/// Normalize an optional reference. Absent references map to [`MISSING_REF`],
/// which never equals a real identifier.
pub fn resolve(reference: Option<&EntityRef>) -> String {
    reference
        .map(EntityRef::canonical)
        .unwrap_or_else(|| MISSING_REF.to_string())
}

/// Reference equality across wire shapes. This is the only equality the core
/// uses for product-to-category matching, order line items against catalog
/// products, and cart keys against product identifiers.
pub fn same_entity(a: Option<&EntityRef>, b: Option<&EntityRef>) -> bool {
    resolve(a) == resolve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_shapes_resolve_to_the_same_identifier() {
        let id = "64a1f2c9b8d7e6a5c4b3a2f1";
        let bare = EntityRef::Id(id.to_string());
        let oid = EntityRef::Oid {
            oid: id.to_string(),
        };
        let doc = EntityRef::Doc {
            id: json!(id),
        };

        assert_eq!(bare.canonical(), id);
        assert_eq!(oid.canonical(), id);
        assert_eq!(doc.canonical(), id);

        assert!(same_entity(Some(&bare), Some(&oid)));
        assert!(same_entity(Some(&oid), Some(&doc)));
        assert!(same_entity(Some(&bare), Some(&doc)));
    }

    #[test]
    fn test_nested_oid_inside_document_shape() {
        let doc = EntityRef::Doc {
            id: json!({ "$oid": "64a1f2c9b8d7e6a5c4b3a2f1" }),
        };
        assert_eq!(doc.canonical(), "64a1f2c9b8d7e6a5c4b3a2f1");
    }

    #[test]
    fn test_sentinel_never_matches_a_real_identifier() {
        let real = EntityRef::Id("64a1f2c9b8d7e6a5c4b3a2f1".to_string());
        assert_ne!(resolve(None), resolve(Some(&real)));
        assert!(!same_entity(None, Some(&real)));
    }

    #[test]
    fn test_wire_shapes_deserialize() {
        let bare: EntityRef = serde_json::from_value(json!("abc123")).unwrap();
        let oid: EntityRef = serde_json::from_value(json!({ "$oid": "abc123" })).unwrap();
        let doc: EntityRef = serde_json::from_value(json!({ "_id": "abc123" })).unwrap();

        assert_eq!(bare.canonical(), "abc123");
        assert_eq!(oid.canonical(), "abc123");
        assert_eq!(doc.canonical(), "abc123");
    }

    #[test]
    fn test_mismatched_identifiers_are_not_equal() {
        let a = EntityRef::Id("a".to_string());
        let b = EntityRef::Oid {
            oid: "b".to_string(),
        };
        assert!(!same_entity(Some(&a), Some(&b)));
    }
}
