//! Descriptor parsing.
//!
//! Mesh descriptor keys:
//!
//! | Key                        | Shape                                               | Required |
//! |----------------------------|-----------------------------------------------------|----------|
//! | `Geometry`                 | map: `Name`, `VertexFormat`, `VertexSize`, `VertexCapacity`, `IndexCapacity` | yes |
//! | `Effects`                  | list of effect material ids, one per segment        | yes      |
//! | `TextureMaps`              | list (per segment) of lists of `{Semantic, TextureId, ArrayIndex}` | no |
//! | `RenderListId`             | integer                                             | no       |
//! | `VisualTechniqueSelection` | map of string to string                             | no       |
//!
//! `Geometry.Name` defaults to the primitive id.
//!
//! Model descriptor keys:
//!
//! | Key         | Shape                                                      | Required |
//! |-------------|------------------------------------------------------------|----------|
//! | `MeshNodes` | list of `{Name, Parent?, Mesh?}`, `Mesh` a mesh descriptor | yes      |
//! | `Animator`  | map: `Name`                                                | no       |

use std::collections::{BTreeMap, HashSet};

use crate::descriptor::{Descriptor, Value};
use crate::error::DescriptorError;
use crate::id::{EffectMaterialId, PrimitiveId, TextureId};
use crate::primitive::{RenderBufferSignature, TextureSlot};

/// Everything a mesh plan needs from its descriptor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MeshLayout {
    pub signature: RenderBufferSignature,
    pub effects: Vec<EffectMaterialId>,
    pub texture_maps: Vec<Vec<TextureSlot>>,
    pub render_list_id: Option<i64>,
    pub visual_technique: BTreeMap<String, String>,
}

impl MeshLayout {
    pub fn parse(id: &PrimitiveId, descriptor: &Descriptor) -> Result<Self, DescriptorError> {
        let geometry = descriptor.require_map("Geometry")?;
        let signature = parse_signature(id, geometry).map_err(|e| e.within("Geometry"))?;

        let effects = descriptor
            .require_list("Effects")?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str()
                    .map(EffectMaterialId::new)
                    .ok_or_else(|| DescriptorError::mismatch(&format!("Effects[{i}]"), "a string"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let texture_maps = match descriptor.optional_list("TextureMaps")? {
            Some(maps) => maps
                .iter()
                .enumerate()
                .map(|(i, slots)| parse_slots(slots, &format!("TextureMaps[{i}]")))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        if texture_maps.len() > effects.len() {
            return Err(DescriptorError::invalid(
                "TextureMaps",
                format!(
                    "{} texture maps for {} effects",
                    texture_maps.len(),
                    effects.len()
                ),
            ));
        }

        let visual_technique = match descriptor.optional_map("VisualTechniqueSelection")? {
            Some(map) => map
                .iter()
                .map(|(k, v)| {
                    v.as_str().map(|s| (k.to_owned(), s.to_owned())).ok_or_else(|| {
                        DescriptorError::mismatch(k, "a string")
                            .within("VisualTechniqueSelection")
                    })
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            signature,
            effects,
            texture_maps,
            render_list_id: descriptor.optional_integer("RenderListId")?,
            visual_technique,
        })
    }

    /// Every texture the mesh declares, in slot order.
    pub fn textures(&self) -> impl Iterator<Item = &TextureId> {
        self.texture_maps.iter().flatten().map(|slot| &slot.texture)
    }
}

fn parse_signature(
    id: &PrimitiveId,
    geometry: &Descriptor,
) -> Result<RenderBufferSignature, DescriptorError> {
    let name = geometry
        .optional_str("Name")?
        .map_or_else(|| id.to_string(), str::to_owned);
    Ok(RenderBufferSignature::new(
        name,
        geometry.require_str("VertexFormat")?,
        geometry.require_u32("VertexSize")?,
        geometry.require_u32("VertexCapacity")?,
        geometry.require_u32("IndexCapacity")?,
    ))
}

fn parse_slots(value: &Value, field: &str) -> Result<Vec<TextureSlot>, DescriptorError> {
    let slots = value
        .as_list()
        .ok_or_else(|| DescriptorError::mismatch(field, "a list"))?;
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let slot_field = format!("{field}[{i}]");
            let slot = slot
                .as_map()
                .ok_or_else(|| DescriptorError::mismatch(&slot_field, "a map"))?;
            parse_slot(slot).map_err(|e| e.within(&slot_field))
        })
        .collect()
}

fn parse_slot(slot: &Descriptor) -> Result<TextureSlot, DescriptorError> {
    let array_index = match slot.optional_integer("ArrayIndex")? {
        Some(_) => slot.require_u32("ArrayIndex")?,
        None => 0,
    };
    Ok(TextureSlot {
        semantic: slot.require_str("Semantic")?.to_owned(),
        texture: TextureId::new(slot.require_str("TextureId")?),
        array_index,
    })
}

/// One node of a model descriptor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NodeLayout {
    pub name: String,
    pub parent: Option<usize>,
    pub mesh: Option<MeshLayout>,
}

/// Everything a model plan needs from its descriptor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ModelLayout {
    pub nodes: Vec<NodeLayout>,
    pub animator: Option<String>,
}

impl ModelLayout {
    /// Parses the model and every child mesh descriptor, so a malformed
    /// child is reported before anything is queued.
    pub fn parse(id: &PrimitiveId, descriptor: &Descriptor) -> Result<Self, DescriptorError> {
        let entries = descriptor.require_list("MeshNodes")?;
        let mut nodes = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let section = format!("MeshNodes[{i}]");
            let node = entry
                .as_map()
                .ok_or_else(|| DescriptorError::mismatch(&section, "a map"))?;
            nodes.push(parse_node(id, node, entries.len()).map_err(|e| e.within(&section))?);
        }

        let mut names = HashSet::new();
        for node in &nodes {
            if !names.insert(node.name.as_str()) {
                return Err(DescriptorError::invalid(
                    "MeshNodes",
                    format!("node name `{}` is used twice", node.name),
                ));
            }
        }

        let animator = match descriptor.optional_map("Animator")? {
            Some(animator) => Some(
                animator
                    .require_str("Name")
                    .map_err(|e| e.within("Animator"))?
                    .to_owned(),
            ),
            None => None,
        };

        Ok(Self { nodes, animator })
    }
}

fn parse_node(
    model: &PrimitiveId,
    node: &Descriptor,
    node_count: usize,
) -> Result<NodeLayout, DescriptorError> {
    let name = node.require_str("Name")?.to_owned();
    let parent = match node.optional_integer("Parent")? {
        None => None,
        Some(p) if p < 0 => None,
        Some(p) => match usize::try_from(p) {
            Ok(p) if p < node_count => Some(p),
            _ => {
                return Err(DescriptorError::invalid(
                    "Parent",
                    format!("{p} is not a node index"),
                ));
            }
        },
    };
    let mesh = match node.optional_map("Mesh")? {
        Some(mesh) => {
            let child_id = model.child(&name);
            Some(MeshLayout::parse(&child_id, mesh).map_err(|e| e.within("Mesh"))?)
        }
        None => None,
    };
    Ok(NodeLayout { name, parent, mesh })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn geometry(name: &str) -> Descriptor {
        Descriptor::new()
            .with("Name", name)
            .with("VertexFormat", "xyz_nor_tex1")
            .with("VertexSize", 32)
            .with("VertexCapacity", 24)
            .with("IndexCapacity", 36)
    }

    pub fn mesh(name: &str, effects: Vec<&str>) -> Descriptor {
        Descriptor::new()
            .with("Geometry", geometry(name))
            .with("Effects", effects)
    }
}
