//! Page element definitions for the site builder.

use crate::error::{BuilderError, BuilderResult};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = String;

/// Semantic content of an element (text, src, alt, level, href, ...).
pub type Props = Map<String, Value>;

/// Visual attributes of an element, keyed by camelCase CSS property name.
pub type Styles = Map<String, Value>;

/// Default size for newly created elements.
pub const DEFAULT_ELEMENT_SIZE: Size = Size::new(200.0, 100.0);

/// Offset applied to the position of a duplicated element.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Placeholder image used for new image elements.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1555066931-4365d14bab8c?w=400&h=300&fit=crop";

/// The visual role of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Heading,
    Image,
    Button,
    Video,
    Form,
    Container,
    Grid,
    Header,
    Hero,
    Features,
    Footer,
    Gallery,
    Embed,
}

impl ElementKind {
    /// Every element kind, in palette order.
    pub const ALL: [ElementKind; 14] = [
        ElementKind::Text,
        ElementKind::Heading,
        ElementKind::Image,
        ElementKind::Button,
        ElementKind::Video,
        ElementKind::Form,
        ElementKind::Container,
        ElementKind::Grid,
        ElementKind::Header,
        ElementKind::Hero,
        ElementKind::Features,
        ElementKind::Footer,
        ElementKind::Gallery,
        ElementKind::Embed,
    ];

    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Heading => "heading",
            ElementKind::Image => "image",
            ElementKind::Button => "button",
            ElementKind::Video => "video",
            ElementKind::Form => "form",
            ElementKind::Container => "container",
            ElementKind::Grid => "grid",
            ElementKind::Header => "header",
            ElementKind::Hero => "hero",
            ElementKind::Features => "features",
            ElementKind::Footer => "footer",
            ElementKind::Gallery => "gallery",
            ElementKind::Embed => "embed",
        }
    }

    /// Whether elements of this kind may own children.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ElementKind::Form
                | ElementKind::Container
                | ElementKind::Grid
                | ElementKind::Header
                | ElementKind::Hero
                | ElementKind::Features
                | ElementKind::Footer
                | ElementKind::Gallery
        )
    }

    /// Default props for a freshly created element of this kind.
    pub fn default_props(self) -> Props {
        let props = match self {
            ElementKind::Text => json!({ "text": "Sample text content" }),
            ElementKind::Heading => json!({ "text": "Heading Title", "level": 2 }),
            ElementKind::Button => json!({ "text": "Click me" }),
            ElementKind::Image => json!({
                "src": PLACEHOLDER_IMAGE_URL,
                "alt": "Placeholder image",
            }),
            ElementKind::Container => json!({ "label": "Container" }),
            _ => json!({ "text": "New element" }),
        };
        into_map(props)
    }

    /// Default styles for a freshly created element of this kind.
    pub fn default_styles(self) -> Styles {
        let base = json!({
            "padding": "16px",
            "margin": "8px",
            "borderRadius": "4px",
        });

        let styles = match self {
            ElementKind::Text => merged(base, json!({
                "fontSize": "16px",
                "lineHeight": "1.5",
            })),
            ElementKind::Heading => merged(base, json!({
                "fontSize": "24px",
                "fontWeight": "bold",
                "marginBottom": "16px",
            })),
            ElementKind::Button => json!({
                "padding": "12px 24px",
                "backgroundColor": "#3b82f6",
                "color": "white",
                "borderRadius": "6px",
                "border": "none",
                "cursor": "pointer",
            }),
            ElementKind::Image => json!({
                "maxWidth": "100%",
                "height": "auto",
                "borderRadius": "4px",
            }),
            ElementKind::Container => json!({
                "padding": "16px",
                "border": "2px dashed #d1d5db",
                "borderRadius": "8px",
                "minHeight": "100px",
                "backgroundColor": "#f9fafb",
            }),
            _ => base,
        };
        into_map(styles)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BuilderError::UnknownKind(s.to_string()))
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn merged(base: Value, extra: Value) -> Value {
    let mut map = into_map(base);
    map.extend(into_map(extra));
    Value::Object(map)
}

/// A node in the page document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(rename = "type")]
    pub(crate) kind: ElementKind,
    /// Semantic content, meaning depends on the kind.
    #[serde(default)]
    pub props: Props,
    /// Visual attributes.
    #[serde(default)]
    pub styles: Styles,
    /// Owned child elements (container kinds only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    /// Advisory id of the owning container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ElementId>,
    /// Top-left position for absolute placement.
    #[serde(default)]
    pub position: Point,
    /// Size used by resize handles.
    #[serde(default)]
    pub size: Size,
    /// Stacking order among siblings.
    #[serde(default)]
    pub z_index: i32,
}

impl Element {
    /// Create a new element with a generated id and the kind's defaults.
    pub fn new(kind: ElementKind) -> Self {
        Self::with_id(generate_id(kind), kind)
    }

    /// Create an element with a specific id (for loading and tests).
    pub fn with_id(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            props: kind.default_props(),
            styles: kind.default_styles(),
            children: Vec::new(),
            parent_id: None,
            position: Point::ZERO,
            size: DEFAULT_ELEMENT_SIZE,
            z_index: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Set the position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the size.
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the stacking order.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set a single prop.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Set a single style.
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    /// Attach children, recording this element as their parent.
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self.adopt_children();
        self
    }

    /// Whether this element has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Find an element in this subtree (including `self`).
    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        find_in(&self.children, id)
    }

    /// Ids of every element in this subtree, `self` first.
    pub fn subtree_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.id.as_str()];
        for child in &self.children {
            ids.extend(child.subtree_ids());
        }
        ids
    }

    /// Check that only container kinds own children, throughout the subtree.
    pub(crate) fn validate_containment(&self) -> BuilderResult<()> {
        if !self.children.is_empty() && !self.kind.is_container() {
            return Err(BuilderError::NotAContainer(self.id.clone()));
        }
        self.children.iter().try_for_each(Element::validate_containment)
    }

    /// Clone this element with fresh ids for the whole subtree, offset by
    /// [`DUPLICATE_OFFSET`].
    pub fn duplicate(&self) -> Element {
        let mut copy = self.clone();
        copy.reassign_ids();
        copy.position += DUPLICATE_OFFSET;
        copy
    }

    fn reassign_ids(&mut self) {
        self.id = generate_id(self.kind);
        for child in &mut self.children {
            child.reassign_ids();
        }
        self.adopt_children();
    }

    fn adopt_children(&mut self) {
        for child in &mut self.children {
            child.parent_id = Some(self.id.clone());
        }
    }

    /// Apply a partial update. Props and styles are merged key by key; the
    /// remaining fields are replaced when present.
    pub(crate) fn apply(&mut self, update: ElementUpdate) {
        if let Some(props) = update.props {
            self.props.extend(props);
        }
        if let Some(styles) = update.styles {
            self.styles.extend(styles);
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(z_index) = update.z_index {
            self.z_index = z_index;
        }
        if let Some(children) = update.children {
            self.children = children;
            self.adopt_children();
        }
    }
}

/// A partial update to an element. The id and kind are not updatable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Styles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Element>>,
}

impl ElementUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one prop key.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set one style key.
    pub fn style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.styles
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn children(mut self, children: Vec<Element>) -> Self {
        self.children = Some(children);
        self
    }
}

/// Generate a fresh element id of the form `<kind>-<uuid>`.
pub fn generate_id(kind: ElementKind) -> ElementId {
    format!("{}-{}", kind, Uuid::new_v4().simple())
}

/// Find an element anywhere in a list of trees.
pub fn find_in<'a>(elements: &'a [Element], id: &str) -> Option<&'a Element> {
    elements.iter().find_map(|element| element.find(id))
}

/// Mutable variant of [`find_in`].
pub(crate) fn find_in_mut<'a>(elements: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
    for element in elements.iter_mut() {
        if element.id == id {
            return Some(element);
        }
        if let Some(found) = find_in_mut(&mut element.children, id) {
            return Some(found);
        }
    }
    None
}

/// Remove an element (and its subtree) from wherever it lives in the tree.
pub(crate) fn remove_from(elements: &mut Vec<Element>, id: &str) -> Option<Element> {
    if let Some(index) = elements.iter().position(|element| element.id == id) {
        return Some(elements.remove(index));
    }
    elements
        .iter_mut()
        .find_map(|element| remove_from(&mut element.children, id))
}

/// Locate the sibling list holding `id` and the element's index within it.
pub(crate) fn sibling_list_mut<'a>(
    elements: &'a mut Vec<Element>,
    id: &str,
) -> Option<(&'a mut Vec<Element>, usize)> {
    if let Some(index) = elements.iter().position(|element| element.id == id) {
        return Some((elements, index));
    }
    elements
        .iter_mut()
        .find_map(|element| sibling_list_mut(&mut element.children, id))
}

/// Every id in a list of trees.
pub fn collect_ids(elements: &[Element]) -> HashSet<&str> {
    elements
        .iter()
        .flat_map(|element| element.subtree_ids())
        .collect()
}

/// Check a whole document: ids are unique across all levels and only
/// container kinds own children.
pub fn validate_elements(elements: &[Element]) -> BuilderResult<()> {
    let mut seen = HashSet::new();
    for element in elements {
        element.validate_containment()?;
        for id in element.subtree_ids() {
            if !seen.insert(id) {
                return Err(BuilderError::DuplicateId(id.to_string()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in ElementKind::ALL {
            assert_eq!(kind.as_str().parse::<ElementKind>().unwrap(), kind);
        }
        assert!(matches!(
            "marquee".parse::<ElementKind>(),
            Err(BuilderError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_default_props_by_kind() {
        let heading = ElementKind::Heading.default_props();
        assert_eq!(heading["text"], "Heading Title");
        assert_eq!(heading["level"], 2);

        let image = ElementKind::Image.default_props();
        assert_eq!(image["src"], PLACEHOLDER_IMAGE_URL);
        assert_eq!(image["alt"], "Placeholder image");

        assert_eq!(ElementKind::Container.default_props()["label"], "Container");
        assert_eq!(ElementKind::Video.default_props()["text"], "New element");
    }

    #[test]
    fn test_default_styles_by_kind() {
        let text = ElementKind::Text.default_styles();
        assert_eq!(text["fontSize"], "16px");
        assert_eq!(text["padding"], "16px");

        let heading = ElementKind::Heading.default_styles();
        assert_eq!(heading["fontSize"], "24px");
        assert_eq!(heading["fontWeight"], "bold");

        let button = ElementKind::Button.default_styles();
        assert_eq!(button["backgroundColor"], "#3b82f6");
        assert_eq!(button["color"], "white");
        assert!(button.get("margin").is_none());

        let container = ElementKind::Container.default_styles();
        assert_eq!(container["border"], "2px dashed #d1d5db");
        assert_eq!(container["minHeight"], "100px");

        let footer = ElementKind::Footer.default_styles();
        assert_eq!(footer.len(), 3);
        assert_eq!(footer["margin"], "8px");
    }

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = Element::new(ElementKind::Button);
        let b = Element::new(ElementKind::Button);
        assert!(a.id().starts_with("button-"));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.size, DEFAULT_ELEMENT_SIZE);
    }

    #[test]
    fn test_apply_merges_props_one_level() {
        let mut element = Element::with_id("text-1", ElementKind::Text).with_prop("href", "/about");
        element.apply(
            ElementUpdate::new()
                .prop("text", "Hello")
                .style("color", "#111")
                .z_index(4),
        );

        assert_eq!(element.props["text"], "Hello");
        assert_eq!(element.props["href"], "/about");
        assert_eq!(element.styles["color"], "#111");
        assert_eq!(element.styles["fontSize"], "16px");
        assert_eq!(element.z_index, 4);
        assert_eq!(element.kind(), ElementKind::Text);
    }

    #[test]
    fn test_duplicate_reassigns_subtree_ids() {
        let container = Element::with_id("container-1", ElementKind::Container)
            .with_position(Point::new(10.0, 15.0))
            .with_children(vec![Element::with_id("text-1", ElementKind::Text)]);

        let copy = container.duplicate();
        assert_ne!(copy.id(), container.id());
        assert_ne!(copy.children[0].id(), "text-1");
        assert_eq!(copy.children[0].parent_id.as_deref(), Some(copy.id()));
        assert_eq!(copy.position, Point::new(30.0, 35.0));
        assert_eq!(copy.children[0].position, Point::ZERO);
        assert_eq!(copy.props, container.props);
        assert_eq!(copy.styles, container.styles);
    }

    #[test]
    fn test_leaf_kinds_reject_children() {
        let text = Element::with_id("text-1", ElementKind::Text)
            .with_children(vec![Element::with_id("text-2", ElementKind::Text)]);
        assert_eq!(
            text.validate_containment(),
            Err(BuilderError::NotAContainer("text-1".to_string()))
        );
    }

    #[test]
    fn test_tree_helpers() {
        let mut elements = vec![
            Element::with_id("hero-1", ElementKind::Hero).with_children(vec![
                Element::with_id("heading-1", ElementKind::Heading),
                Element::with_id("button-1", ElementKind::Button),
            ]),
            Element::with_id("text-1", ElementKind::Text),
        ];

        assert!(find_in(&elements, "button-1").is_some());
        assert_eq!(collect_ids(&elements).len(), 4);

        let (siblings, index) = sibling_list_mut(&mut elements, "button-1").unwrap();
        assert_eq!(siblings.len(), 2);
        assert_eq!(index, 1);

        let removed = remove_from(&mut elements, "heading-1").unwrap();
        assert_eq!(removed.id(), "heading-1");
        assert!(find_in(&elements, "heading-1").is_none());
        assert_eq!(elements[0].children.len(), 1);
    }

    #[test]
    fn test_validate_elements() {
        let valid = vec![
            Element::with_id("hero-1", ElementKind::Hero)
                .with_children(vec![Element::with_id("text-1", ElementKind::Text)]),
            Element::with_id("text-2", ElementKind::Text),
        ];
        assert_eq!(validate_elements(&valid), Ok(()));
        assert_eq!(validate_elements(&[]), Ok(()));

        let top_level_clash = vec![
            Element::with_id("a", ElementKind::Text),
            Element::with_id("a", ElementKind::Button),
        ];
        assert_eq!(
            validate_elements(&top_level_clash),
            Err(BuilderError::DuplicateId("a".to_string()))
        );

        let nested_clash = vec![
            Element::with_id("text-1", ElementKind::Text),
            Element::with_id("grid-1", ElementKind::Grid)
                .with_children(vec![Element::with_id("text-1", ElementKind::Text)]),
        ];
        assert_eq!(
            validate_elements(&nested_clash),
            Err(BuilderError::DuplicateId("text-1".to_string()))
        );

        let leaf_parent = vec![Element::with_id("t", ElementKind::Text)
            .with_children(vec![Element::with_id("c", ElementKind::Text)])];
        assert_eq!(
            validate_elements(&leaf_parent),
            Err(BuilderError::NotAContainer("t".to_string()))
        );
    }

    #[test]
    fn test_wire_format() {
        let element = Element::with_id("text-1", ElementKind::Text)
            .with_position(Point::new(0.0, 120.0))
            .with_z_index(2);
        let json = serde_json::to_value(&element).unwrap();

        assert_eq!(json["type"], "text");
        assert_eq!(json["zIndex"], 2);
        assert_eq!(json["position"]["y"], 120.0);
        assert_eq!(json["size"]["width"], 200.0);
        assert!(json.get("children").is_none());

        let parsed: Element = serde_json::from_value(json!({
            "id": "header-1",
            "type": "header",
            "props": { "text": "Welcome" },
            "styles": { "fontSize": "32px" },
            "position": { "x": 0, "y": 0 },
            "size": { "width": 800, "height": 100 },
            "zIndex": 1
        }))
        .unwrap();
        assert_eq!(parsed.kind(), ElementKind::Header);
        assert_eq!(parsed.size, Size::new(800.0, 100.0));
        assert!(parsed.is_leaf());
    }
}
