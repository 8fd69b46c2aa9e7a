//! Attribute payloads for created documents

use crate::types::{AssetRef, DocumentKind};
use serde_json::{json, Map, Value};

/// Token label display mode: always shown on hover by anyone
const TOKEN_DISPLAY_NAME_HOVER_ANYONE: u8 = 20;
/// Default ownership level for notes: observer
const NOTE_DEFAULT_OWNERSHIP: u8 = 2;

/// Attributes for an actor, optionally seeded from a catalog template.
///
/// The template's own identifier is dropped; name, image and token texture
/// always come from the import.
#[must_use]
pub fn actor_attributes(name: &str, asset: &AssetRef, template: Option<Value>) -> Value {
    let own = json!({
        "name": name,
        "img": asset.as_str(),
        "prototypeToken": {
            "name": name,
            "texture": { "src": asset.as_str() },
            "displayName": TOKEN_DISPLAY_NAME_HOVER_ANYONE,
            "actorLink": false,
        },
    });

    match template {
        Some(Value::Object(mut base)) => {
            base.remove("_id");
            merge_into(&mut base, own);
            Value::Object(base)
        }
        _ => own,
    }
}

/// Attributes for a note holding a single image page
#[must_use]
pub fn note_attributes(name: &str, asset: &AssetRef) -> Value {
    json!({
        "name": name,
        "pages": [{ "name": name, "type": "image", "src": asset.as_str() }],
        "ownership": { "default": NOTE_DEFAULT_OWNERSHIP },
    })
}

/// Attributes for `kind`
#[must_use]
pub fn attributes_for(
    kind: DocumentKind,
    name: &str,
    asset: &AssetRef,
    template: Option<Value>,
) -> Value {
    match kind {
        DocumentKind::Actor => actor_attributes(name, asset, template),
        DocumentKind::Note => note_attributes(name, asset),
    }
}

/// Deep-merge `overlay` into `base`; objects merge recursively, anything else replaces.
fn merge_into(base: &mut Map<String, Value>, overlay: Value) {
    let Value::Object(overlay) = overlay else {
        return;
    };
    for (key, value) in overlay {
        if value.is_object() {
            if let Some(Value::Object(existing)) = base.get_mut(&key) {
                merge_into(existing, value);
                continue;
            }
        }
        base.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn asset() -> AssetRef {
        AssetRef("uploads/dragupload/actors/orc_1_0.png".to_string())
    }

    #[test]
    fn plain_actor() {
        let attrs = actor_attributes("Orc", &asset(), None);
        assert_eq!(attrs["name"], "Orc");
        assert_eq!(attrs["prototypeToken"]["texture"]["src"], asset().as_str());
        assert_eq!(attrs["prototypeToken"]["actorLink"], false);
    }

    #[test]
    fn template_merge_overrides_identity() {
        let template = json!({
            "_id": "abc",
            "name": "orc",
            "img": "old.png",
            "system": { "hp": 15 },
            "prototypeToken": { "texture": { "src": "old.png", "scaleX": 2 }, "width": 2 },
        });
        let attrs = actor_attributes("Orc", &asset(), Some(template));

        assert!(attrs.get("_id").is_none());
        assert_eq!(attrs["name"], "Orc");
        assert_eq!(attrs["img"], asset().as_str());
        assert_eq!(attrs["system"]["hp"], 15);
        assert_eq!(attrs["prototypeToken"]["width"], 2);
        assert_eq!(attrs["prototypeToken"]["texture"]["scaleX"], 2);
        assert_eq!(attrs["prototypeToken"]["texture"]["src"], asset().as_str());
    }

    #[test]
    fn note_has_image_page() {
        let attrs = attributes_for(DocumentKind::Note, "Map", &asset(), Some(json!({"x": 1})));
        assert_eq!(attrs["pages"][0]["type"], "image");
        assert_eq!(attrs["ownership"]["default"], 2);
        assert!(attrs.get("x").is_none());
    }
}
