use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property name holding a block's texture(s).
pub const TEXTURE_PROPERTY: &str = "texture";

/// A texture property value: one name, or one name per face.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TextureProperty {
    Single(String),
    Many(Vec<String>),
}

impl TextureProperty {
    pub fn names(&self) -> &[String] {
        match self {
            TextureProperty::Single(name) => std::slice::from_ref(name),
            TextureProperty::Many(names) => names,
        }
    }
}

/// Supplies per-block property values in registration order.
pub trait Registry {
    fn list_texture_property_values(&self, property: &str) -> Vec<TextureProperty>;
}

/// Flatten property values into one ordered name list. Duplicates are kept.
pub fn flatten_texture_names<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TextureProperty>,
{
    values
        .into_iter()
        .flat_map(|v| v.names().iter().cloned())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockEntry {
    pub name: String,
    #[serde(default)]
    pub props: BTreeMap<String, TextureProperty>,
}

/// In-memory block registry, typically loaded from a YAML or JSON list of blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BlockRegistry {
    blocks: Vec<BlockEntry>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block with a texture property.
    pub fn register(&mut self, name: impl Into<String>, texture: TextureProperty) {
        let mut props = BTreeMap::new();
        props.insert(TEXTURE_PROPERTY.to_string(), texture);
        self.blocks.push(BlockEntry {
            name: name.into(),
            props,
        });
    }

    pub fn push(&mut self, entry: BlockEntry) {
        self.blocks.push(entry);
    }

    pub fn blocks(&self) -> &[BlockEntry] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Registry for BlockRegistry {
    fn list_texture_property_values(&self, property: &str) -> Vec<TextureProperty> {
        self.blocks
            .iter()
            .filter_map(|b| b.props.get(property).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_preserves_order_and_duplicates() {
        let values = vec![
            TextureProperty::Single("stone".into()),
            TextureProperty::Many(vec!["grass_top".into(), "dirt".into(), "grass_side".into()]),
            TextureProperty::Single("dirt".into()),
        ];
        assert_eq!(
            flatten_texture_names(&values),
            vec!["stone", "grass_top", "dirt", "grass_side", "dirt"]
        );
    }

    #[test]
    fn blocks_without_property_are_skipped() {
        let mut reg = BlockRegistry::new();
        reg.register("stone", TextureProperty::Single("stone".into()));
        reg.push(BlockEntry {
            name: "air".into(),
            props: BTreeMap::new(),
        });
        reg.register("log", TextureProperty::Many(vec!["log_top".into(), "log_side".into()]));
        let values = reg.list_texture_property_values(TEXTURE_PROPERTY);
        assert_eq!(values.len(), 2);
        assert_eq!(flatten_texture_names(&values), vec!["stone", "log_top", "log_side"]);
    }

    #[test]
    fn untagged_property_deserializes_both_shapes() {
        let json = r#"[
            {"name": "stone", "props": {"texture": "stone"}},
            {"name": "grass", "props": {"texture": ["grass_top", "dirt"]}}
        ]"#;
        let reg: BlockRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(
            reg.blocks()[1].props["texture"],
            TextureProperty::Many(vec!["grass_top".into(), "dirt".into()])
        );
    }
}
