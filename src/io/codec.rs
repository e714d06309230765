//! Dataset codec: decode files into the `Dataset` model and encode them back.
//!
//! `DicomCodec` is the production implementation on top of dicom-rs. Elements the
//! mutator did not change are written back from the originally decoded element,
//! so binary payloads and untouched text round-trip byte for byte.
use std::path::{Path, PathBuf};

use dicom::core::header::Header;
use dicom::core::value::{C, DataSetSequence, PrimitiveValue, Value};
use dicom::core::{DataElement, Length, Tag, VR};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::mem::InMemElement;
use dicom::object::{FileDicomObject, InMemDicomObject, open_file};
use thiserror::Error;
use tracing::debug;

use crate::core::tags::KeywordDictionary;
use crate::core::vr::VrClass;
use crate::io::dataset::{Dataset, Element, ElementValue};
use crate::io::formatting::{format_tag, summarize_value};

/// Errors raised while decoding or encoding a dataset file
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{path}: not a readable dataset ({reason})")]
    Decode { path: PathBuf, reason: String },
    #[error("{path}: failed to write dataset ({reason})")]
    Encode { path: PathBuf, reason: String },
    #[error("Element {tag} has no encodable value: {reason}")]
    Element { tag: String, reason: String },
    #[error("Dataset has no file meta information")]
    MissingMeta,
}

/// Reads and writes datasets on disk
pub trait DatasetCodec: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Dataset, CodecError>;
    fn encode(&self, dataset: &Dataset, path: &Path) -> Result<(), CodecError>;
}

/// DICOM Part 10 codec backed by dicom-rs
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomCodec;

impl DicomCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DatasetCodec for DicomCodec {
    fn decode(&self, path: &Path) -> Result<Dataset, CodecError> {
        let object = open_file(path).map_err(|err| CodecError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let meta = object.meta().clone();
        let dataset = project_object(&object, &StandardDataDictionary);
        debug!("Decoded {} ({} top-level elements)", path.display(), dataset.len());
        Ok(dataset.with_meta(meta))
    }

    fn encode(&self, dataset: &Dataset, path: &Path) -> Result<(), CodecError> {
        let meta = dataset.meta().ok_or(CodecError::MissingMeta)?.clone();
        let mut file = FileDicomObject::<InMemDicomObject>::new_empty_with_meta(meta);
        for element in dataset.elements() {
            file.put(to_dicom_element(element)?);
        }
        file.write_to_file(path).map_err(|err| CodecError::Encode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

fn project_object(object: &InMemDicomObject, dictionary: &dyn KeywordDictionary) -> Dataset {
    let elements = object
        .iter()
        .map(|element| project_element(element, dictionary))
        .collect();
    Dataset::from_elements(elements)
}

fn project_element(element: &InMemElement, dictionary: &dyn KeywordDictionary) -> Element {
    let tag = element.tag();
    let vr = element.vr();
    let value = match (element.value(), VrClass::of(vr)) {
        (Value::Sequence(sequence), _) => ElementValue::Items(
            sequence
                .items()
                .iter()
                .map(|item| project_object(item, dictionary))
                .collect(),
        ),
        (Value::Primitive(PrimitiveValue::Empty), VrClass::Textual) => {
            ElementValue::Text(String::new())
        }
        (Value::Primitive(primitive), VrClass::Textual) if primitive.multiplicity() > 1 => {
            ElementValue::Multi(
                primitive
                    .to_multi_str()
                    .iter()
                    .map(|part| trim_padding(part).to_string())
                    .collect(),
            )
        }
        (Value::Primitive(primitive), VrClass::Textual) => {
            ElementValue::Text(trim_padding(&primitive.to_str()).to_string())
        }
        (Value::Primitive(primitive), VrClass::Numeric)
            if !matches!(primitive, PrimitiveValue::Empty) =>
        {
            ElementValue::Numeric(primitive.to_multi_str().into_owned())
        }
        (value, _) => ElementValue::Opaque(summarize_value(value, vr)),
    };

    let projected = Element::new(tag, vr, value).with_source(element.clone());
    match dictionary.tag_to_keyword(tag) {
        Some(keyword) => projected.with_keyword(keyword),
        None => projected,
    }
}

/// Strip the space/NUL padding used to reach even value lengths.
fn trim_padding(value: &str) -> &str {
    value.trim_end_matches([' ', '\0'])
}

fn to_dicom_element(element: &Element) -> Result<InMemElement, CodecError> {
    let tag = element.tag();
    let vr = element.vr();

    if let ElementValue::Items(items) = element.value() {
        let items = items
            .iter()
            .map(to_dicom_object)
            .collect::<Result<C<_>, _>>()?;
        return Ok(DataElement::new(
            tag,
            vr,
            Value::Sequence(DataSetSequence::new(items, Length::UNDEFINED)),
        ));
    }

    if !element.is_dirty() {
        if let Some(source) = element.source() {
            return Ok(source.clone());
        }
    }

    let primitive = match element.value() {
        ElementValue::Text(text) => PrimitiveValue::from(text.clone()),
        ElementValue::Multi(parts) => PrimitiveValue::Strs(parts.iter().cloned().collect()),
        ElementValue::Numeric(parts) => numeric_primitive(tag, vr, parts)?,
        ElementValue::Opaque(_) | ElementValue::Items(_) => {
            return Err(CodecError::Element {
                tag: format_tag(tag),
                reason: "opaque value without its original payload".to_string(),
            });
        }
    };
    Ok(DataElement::new(tag, vr, primitive))
}

fn to_dicom_object(dataset: &Dataset) -> Result<InMemDicomObject, CodecError> {
    let mut object = InMemDicomObject::new_empty();
    for element in dataset.elements() {
        object.put(to_dicom_element(element)?);
    }
    Ok(object)
}

fn numeric_primitive(tag: Tag, vr: VR, parts: &[String]) -> Result<PrimitiveValue, CodecError> {
    fn parse_all<T: std::str::FromStr>(
        tag: Tag,
        vr: VR,
        parts: &[String],
    ) -> Result<Vec<T>, CodecError> {
        parts
            .iter()
            .map(|part| {
                part.trim().parse::<T>().map_err(|_| CodecError::Element {
                    tag: format_tag(tag),
                    reason: format!("'{part}' is not a valid {vr} value"),
                })
            })
            .collect()
    }

    Ok(match vr {
        VR::US => PrimitiveValue::U16(parse_all::<u16>(tag, vr, parts)?.into()),
        VR::SS => PrimitiveValue::I16(parse_all::<i16>(tag, vr, parts)?.into()),
        VR::UL => PrimitiveValue::U32(parse_all::<u32>(tag, vr, parts)?.into()),
        VR::SL => PrimitiveValue::I32(parse_all::<i32>(tag, vr, parts)?.into()),
        VR::UV => PrimitiveValue::U64(parse_all::<u64>(tag, vr, parts)?.into()),
        VR::SV => PrimitiveValue::I64(parse_all::<i64>(tag, vr, parts)?.into()),
        VR::FL => PrimitiveValue::F32(parse_all::<f32>(tag, vr, parts)?.into()),
        VR::FD => PrimitiveValue::F64(parse_all::<f64>(tag, vr, parts)?.into()),
        _ => {
            return Err(CodecError::Element {
                tag: format_tag(tag),
                reason: format!("{vr} is not a numeric VR"),
            });
        }
    })
}
