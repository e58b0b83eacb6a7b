//! Scene style system
//!
//! Sibling-group coloring, sex-driven node shapes and relationship edge
//! styles. Colors travel to the renderer as `#RRGGBB` tokens.

use crate::forest::LayoutForest;
use crate::graph::{FamilyGraph, PersonIndex};
use kinship_core::{RelType, Sex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or the short `#RGB` form.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color {raw:?}")))
    }
}

// ============================================================================
// Color Constants
// ============================================================================

pub const COLOR_NEUTRAL: Color = Color::rgb(0xD3, 0xD3, 0xD3);

pub const SIBLING_PALETTE: [Color; 9] = [
    Color::rgb(0xFF, 0xA0, 0x7A),
    Color::rgb(0x98, 0xFB, 0x98),
    Color::rgb(0x87, 0xCE, 0xFA),
    Color::rgb(0xDD, 0xA0, 0xDD),
    Color::rgb(0xF4, 0xA4, 0x60),
    Color::rgb(0x66, 0xCD, 0xAA),
    Color::rgb(0xFF, 0xB6, 0xC1),
    Color::rgb(0xE6, 0xE6, 0xFA),
    Color::rgb(0x20, 0xB2, 0xAA),
];

pub const COLOR_EDGE_CHILD: Color = Color::rgb(0x55, 0x55, 0x55);
pub const COLOR_EDGE_SPOUSE: Color = Color::rgb(0xE9, 0x1E, 0x63);

/// Ordered sibling colors plus the token for people without a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
    neutral: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: SIBLING_PALETTE.to_vec(),
            neutral: COLOR_NEUTRAL,
        }
    }
}

impl Palette {
    /// Builds a palette from hex strings. Returns `None` when the list is
    /// empty or any entry fails to parse.
    pub fn from_hex<S: AsRef<str>>(entries: &[S]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let colors = entries
            .iter()
            .map(|e| Color::from_hex(e.as_ref()))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            colors,
            neutral: COLOR_NEUTRAL,
        })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for a palette slot; `None` is the neutral token.
    pub fn color(&self, slot: Option<usize>) -> Color {
        slot.and_then(|i| self.colors.get(i).copied())
            .unwrap_or(self.neutral)
    }
}

/// Palette slot per person, from sibling groups.
///
/// A sibling group is everyone sharing the same set of parents. Groups are
/// discovered in layout visit order; only groups of two or more are colored.
/// A group's slot is its ordinal among colored groups, shifted past the
/// first parent's own slot so children rarely repeat their parent's color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingColoring {
    slots: Vec<Option<usize>>,
}

impl SiblingColoring {
    pub fn assign(graph: &FamilyGraph, forest: &LayoutForest, palette_len: usize) -> Self {
        let mut slots = vec![None; graph.len()];
        if palette_len == 0 {
            return Self { slots };
        }

        let mut groups: HashMap<Vec<PersonIndex>, Vec<PersonIndex>> = HashMap::new();
        let mut discovered: Vec<Vec<PersonIndex>> = Vec::new();
        for &person in forest.visit_order() {
            let parents = graph.parents_of(person);
            if parents.is_empty() {
                continue;
            }
            let mut key = parents.to_vec();
            key.sort();
            key.dedup();
            let members = groups.entry(key.clone()).or_insert_with(|| {
                discovered.push(key);
                Vec::new()
            });
            members.push(person);
        }

        let mut ordinal = 0;
        for key in &discovered {
            let Some(members) = groups.get(key) else {
                continue;
            };
            if members.len() < 2 {
                continue;
            }
            let offset = graph
                .parents_of(members[0])
                .first()
                .and_then(|parent| slots[parent.0])
                .map_or(0, |slot| slot + 1);
            let slot = (ordinal + offset) % palette_len;
            for member in members {
                slots[member.0] = Some(slot);
            }
            ordinal += 1;
        }

        Self { slots }
    }

    pub fn slot(&self, person: PersonIndex) -> Option<usize> {
        self.slots.get(person.0).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Square,
    Circle,
    Diamond,
}

impl NodeShape {
    pub fn for_sex(sex: Sex) -> Self {
        match sex {
            Sex::M => NodeShape::Square,
            Sex::F => NodeShape::Circle,
            Sex::U => NodeShape::Diamond,
        }
    }
}

/// Border treatment for a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill: Color,
    pub border: Color,
    pub border_width: f32,
    pub dashed: bool,
}

/// Edge color and style
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
    pub arrow_head: bool,
}

pub fn get_node_style(fill: Color, is_draft: bool, is_root: bool) -> NodeStyle {
    NodeStyle {
        fill,
        border: fill.darken(0.4),
        border_width: if is_root { 3.0 } else { 1.5 },
        dashed: is_draft,
    }
}

/// Style for a relationship edge. Drafts are drawn dashed and faded.
pub fn get_edge_style(kind: RelType, is_draft: bool) -> EdgeStyle {
    let base = get_edge_color(kind);
    EdgeStyle {
        color: if is_draft { base.lighten(0.4) } else { base },
        width: 2.0,
        dashed: is_draft || matches!(kind, RelType::SPOUSE_OF),
        arrow_head: false,
    }
}

pub fn get_edge_color(kind: RelType) -> Color {
    match kind {
        RelType::SPOUSE_OF => COLOR_EDGE_SPOUSE,
        RelType::CHILD_OF | RelType::EARLIEST_ANCESTOR => COLOR_EDGE_CHILD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinship_core::{Person, PersonId, Relationship};

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Color::from_hex("#FFA07A"), Some(SIBLING_PALETTE[0]));
        assert_eq!(Color::from_hex("#555"), Some(COLOR_EDGE_CHILD));
        assert_eq!(Color::from_hex("FFA07A"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(COLOR_EDGE_SPOUSE.to_hex(), "#E91E63");

        let json = serde_json::to_string(&COLOR_NEUTRAL).unwrap();
        assert_eq!(json, "\"#D3D3D3\"");
    }

    #[test]
    fn test_palette_fallback() {
        assert!(Palette::from_hex::<String>(&[]).is_none());
        assert!(Palette::from_hex(&["#000000", "oops"]).is_none());
        let palette = Palette::from_hex(&["#000000", "#FFFFFF"]).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.color(Some(1)), Color::rgb(255, 255, 255));
        assert_eq!(palette.color(None), COLOR_NEUTRAL);
        assert_eq!(Palette::default().len(), 9);
    }

    #[test]
    fn test_shapes_follow_sex() {
        assert_eq!(NodeShape::for_sex(Sex::M), NodeShape::Square);
        assert_eq!(NodeShape::for_sex(Sex::F), NodeShape::Circle);
        assert_eq!(NodeShape::for_sex(Sex::U), NodeShape::Diamond);
    }

    #[test]
    fn test_edge_styles() {
        let child = get_edge_style(RelType::CHILD_OF, false);
        assert_eq!(child.color, COLOR_EDGE_CHILD);
        assert!(!child.dashed);

        let spouse = get_edge_style(RelType::SPOUSE_OF, false);
        assert_eq!(spouse.color, COLOR_EDGE_SPOUSE);
        assert!(spouse.dashed);

        let draft = get_edge_style(RelType::CHILD_OF, true);
        assert!(draft.dashed);
        assert_ne!(draft.color, child.color);
    }

    #[test]
    fn test_sibling_groups_colored_only_children_neutral() {
        let people: Vec<Person> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|id| Person::new(*id, *id))
            .collect();
        let rels = vec![
            Relationship::earliest_ancestor("r0", "a"),
            Relationship::child_of("r1", "b", "a"),
            Relationship::child_of("r2", "c", "a"),
            Relationship::child_of("r3", "d", "b"),
            Relationship::child_of("r4", "e", "c"),
            Relationship::child_of("r5", "f", "c"),
        ];
        let graph = FamilyGraph::build(&people, &rels);
        let forest = LayoutForest::build(&graph, 1);
        let coloring = SiblingColoring::assign(&graph, &forest, 9);
        let slot = |id: &str| coloring.slot(graph.index_of(&PersonId::from(id)).unwrap());

        assert_eq!(slot("a"), None);
        assert_eq!(slot("b"), Some(0));
        assert_eq!(slot("c"), Some(0));
        // only child
        assert_eq!(slot("d"), None);
        // second colored group, shifted past parent c's slot
        assert_eq!(slot("e"), Some(2));
        assert_eq!(slot("f"), Some(2));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_hex_round_trip(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                let color = Color::rgb(r, g, b);
                prop_assert_eq!(Color::from_hex(&color.to_hex()), Some(color));
            }

            #[test]
            fn prop_lighten_never_darkens(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), f in 0.0f32..1.0) {
                let color = Color::rgb(r, g, b);
                let light = color.lighten(f);
                prop_assert!(light.r >= color.r && light.g >= color.g && light.b >= color.b);
                let dark = color.darken(f);
                prop_assert!(dark.r <= color.r && dark.g <= color.g && dark.b <= color.b);
            }
        }
    }
}
