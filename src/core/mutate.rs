//! Element-level search and replace with change tracking.
//!
//! Walks the whole element tree (nested sequence items included), applies the
//! substitution to every candidate element, validates the prospective value
//! against its VR, and records one `ChangeRecord` per element that changed.
use dicom::core::Tag;
use tracing::{debug, error, warn};

use crate::core::substitution::Substitution;
use crate::core::tags::TagSet;
use crate::core::vr::{self, VrClass};
use crate::error::ERROR_TARGET;
use crate::io::dataset::{Dataset, Element, ElementValue};
use crate::io::formatting::format_tag;

/// Which elements are candidates for substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// Every element with a string-like VR
    StringLike,
    /// Only elements whose tag is in the set
    Only(TagSet),
}

impl TagFilter {
    pub fn from_tags(tags: Option<TagSet>) -> Self {
        match tags {
            Some(tags) if !tags.is_empty() => TagFilter::Only(tags),
            _ => TagFilter::StringLike,
        }
    }

    fn admits(&self, element: &Element, allow_binary: bool) -> bool {
        match self {
            TagFilter::StringLike => vr::is_string_like(element.vr()),
            TagFilter::Only(tags) => {
                tags.contains(element.tag())
                    && match element.vr_class() {
                        VrClass::Textual => true,
                        VrClass::Numeric => allow_binary,
                        VrClass::Sequence | VrClass::Opaque => false,
                    }
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MutationOptions {
    /// Compute changes without writing them into the dataset
    pub dry_run: bool,
    /// Let an explicit tag filter reach binary numeric elements
    pub allow_binary: bool,
}

/// One element whose value was (or, under dry-run, would be) changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub tag: Tag,
    pub keyword: Option<String>,
    pub old: String,
    pub new: String,
}

/// Apply `substitution` to every candidate element of `dataset`.
///
/// Returns exactly the elements that changed. Unless `options.dry_run` is set the
/// new values are written into `dataset` before returning. Elements whose new
/// value fails VR validation are left untouched and produce no record.
pub fn mutate(
    dataset: &mut Dataset,
    filter: &TagFilter,
    substitution: &Substitution,
    options: MutationOptions,
) -> Vec<ChangeRecord> {
    let mut changes = Vec::new();
    mutate_into(dataset, filter, substitution, options, &mut changes);
    changes
}

fn mutate_into(
    dataset: &mut Dataset,
    filter: &TagFilter,
    substitution: &Substitution,
    options: MutationOptions,
    changes: &mut Vec<ChangeRecord>,
) {
    for element in dataset.elements_mut() {
        if let ElementValue::Items(items) = element.value_mut() {
            for item in items.iter_mut() {
                mutate_into(item, filter, substitution, options, changes);
            }
            continue;
        }

        if !filter.admits(element, options.allow_binary) {
            if let TagFilter::Only(tags) = filter {
                if tags.contains(element.tag()) {
                    debug!(
                        "Skipping {} [{}]: not a textual element",
                        format_tag(element.tag()),
                        element.vr()
                    );
                }
            }
            continue;
        }

        let Some(new_value) = substitute(element, substitution) else {
            continue;
        };

        if let Err(reason) = check(element, &new_value) {
            match reason {
                Rejection::TooLong => warn!(
                    target: ERROR_TARGET,
                    "Skipping tag {} {}: new value exceeds VR {} max length",
                    format_tag(element.tag()),
                    element.keyword().unwrap_or("Unknown"),
                    element.vr()
                ),
                Rejection::NotNumeric(part) => error!(
                    target: ERROR_TARGET,
                    "Skipping tag {} {}: '{}' is not a valid {} value",
                    format_tag(element.tag()),
                    element.keyword().unwrap_or("Unknown"),
                    part,
                    element.vr()
                ),
            }
            continue;
        }

        changes.push(ChangeRecord {
            tag: element.tag(),
            keyword: element.keyword().map(str::to_string),
            old: element.value().render(),
            new: new_value.render(),
        });

        if !options.dry_run {
            element.set_value(new_value);
        }
    }
}

/// The substituted value, or `None` when nothing changed.
fn substitute(element: &Element, substitution: &Substitution) -> Option<ElementValue> {
    match element.value() {
        ElementValue::Text(old) => {
            let new = substitution.apply(old);
            (new != old.as_str()).then(|| ElementValue::Text(new.into_owned()))
        }
        ElementValue::Multi(parts) | ElementValue::Numeric(parts) => {
            let mut changed = false;
            let new_parts: Vec<String> = parts
                .iter()
                .map(|part| {
                    let new = substitution.apply(part);
                    changed |= new != part.as_str();
                    new.into_owned()
                })
                .collect();
            if !changed {
                return None;
            }
            Some(match element.value() {
                ElementValue::Numeric(_) => ElementValue::Numeric(new_parts),
                _ => ElementValue::Multi(new_parts),
            })
        }
        ElementValue::Items(_) | ElementValue::Opaque(_) => None,
    }
}

enum Rejection {
    TooLong,
    NotNumeric(String),
}

fn check(element: &Element, value: &ElementValue) -> Result<(), Rejection> {
    let vr = element.vr();
    match value {
        ElementValue::Text(text) if vr::validate(text, vr) => Ok(()),
        ElementValue::Text(_) => Err(Rejection::TooLong),
        ElementValue::Multi(parts) => match parts.iter().all(|part| vr::validate(part, vr)) {
            true => Ok(()),
            false => Err(Rejection::TooLong),
        },
        ElementValue::Numeric(parts) => match parts
            .iter()
            .find(|part| !vr::parses_as_numeric(part, vr))
        {
            Some(part) => Err(Rejection::NotNumeric(part.clone())),
            None => Ok(()),
        },
        ElementValue::Items(_) | ElementValue::Opaque(_) => Ok(()),
    }
}
