//! In-memory view of one decoded dataset.
//!
//! Every element carries its canonical tag, VR, dictionary keyword and a value
//! classified into a closed set of variants. Elements decoded from a file keep
//! the original codec element so untouched values are written back verbatim.
use dicom::core::{Tag, VR};
use dicom::object::FileMetaTable;
use dicom::object::mem::InMemElement;

use crate::core::vr::VrClass;

/// Value of a single element, classified by what the mutator may do with it
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Single textual value
    Text(String),
    /// Textual value with more than one component
    Multi(Vec<String>),
    /// Binary-encoded numbers, rendered as text components
    Numeric(Vec<String>),
    /// Sequence items (nested datasets)
    Items(Vec<Dataset>),
    /// Anything else, carried as a display summary only
    Opaque(String),
}

impl ElementValue {
    /// Textual rendering; components are joined with the DICOM value delimiter.
    pub fn render(&self) -> String {
        match self {
            ElementValue::Text(value) => value.clone(),
            ElementValue::Multi(parts) | ElementValue::Numeric(parts) => parts.join("\\"),
            ElementValue::Items(items) => {
                let count = items.len();
                let suffix = if count == 1 { "" } else { "s" };
                format!("Sequence ({count} item{suffix})")
            }
            ElementValue::Opaque(summary) => summary.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: Tag,
    vr: VR,
    keyword: Option<String>,
    value: ElementValue,
    source: Option<InMemElement>,
    dirty: bool,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.vr == other.vr && self.value == other.value
    }
}

impl Element {
    pub fn new(tag: Tag, vr: VR, value: ElementValue) -> Self {
        Self {
            tag,
            vr,
            keyword: None,
            value,
            source: None,
            dirty: false,
        }
    }

    /// Single-valued textual element
    pub fn text(tag: Tag, vr: VR, value: impl Into<String>) -> Self {
        Self::new(tag, vr, ElementValue::Text(value.into()))
    }

    /// Sequence element holding nested datasets
    pub fn sequence(tag: Tag, items: Vec<Dataset>) -> Self {
        Self::new(tag, VR::SQ, ElementValue::Items(items))
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub(crate) fn with_source(mut self, source: InMemElement) -> Self {
        self.source = Some(source);
        self
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn vr(&self) -> VR {
        self.vr
    }

    pub fn vr_class(&self) -> VrClass {
        VrClass::of(self.vr)
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn value(&self) -> &ElementValue {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut ElementValue {
        &mut self.value
    }

    /// Assign a new value in place, marking the element for re-encoding.
    pub fn set_value(&mut self, value: ElementValue) {
        self.value = value;
        self.dirty = true;
    }

    /// Whether the value differs from what was decoded
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn source(&self) -> Option<&InMemElement> {
        self.source.as_ref()
    }
}

/// Ordered collection of elements read from one file (or one sequence item)
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    elements: Vec<Element>,
    meta: Option<FileMetaTable>,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            meta: None,
        }
    }

    pub(crate) fn with_meta(mut self, meta: FileMetaTable) -> Self {
        self.meta = Some(meta);
        self
    }

    pub(crate) fn meta(&self) -> Option<&FileMetaTable> {
        self.meta.as_ref()
    }

    /// Insert an element, replacing any element with the same tag.
    pub fn put(&mut self, element: Element) {
        match self.elements.iter().position(|e| e.tag == element.tag) {
            Some(index) => self.elements[index] = element,
            None => self.elements.push(element),
        }
    }

    /// Top-level element lookup by canonical tag
    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.iter().find(|e| e.tag == tag)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Depth-first traversal of the full element tree, including elements of
    /// nested sequence items. The callback receives each element with its depth.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut dyn FnMut(&'a Element, usize)) {
        for element in &self.elements {
            visit(element, depth);
            if let ElementValue::Items(items) = &element.value {
                for item in items {
                    item.walk_at(depth + 1, visit);
                }
            }
        }
    }

    /// Find the first element with `tag` anywhere in the tree.
    pub fn find(&self, tag: Tag) -> Option<&Element> {
        let mut found = None;
        self.walk(&mut |element, _| {
            if found.is_none() && element.tag == tag {
                found = Some(element);
            }
        });
        found
    }
}
