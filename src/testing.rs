//! Shared test helpers: a small keyword dictionary and a line-based codec that
//! stores datasets as plain text, so persistence and orchestration can be
//! exercised without building DICOM files.
use std::fs;
use std::path::Path;
use std::str::FromStr;

use dicom::core::{Tag, VR};

use crate::core::tags::{KeywordDictionary, parse_hex_pair};
use crate::core::vr::VrClass;
use crate::io::codec::{CodecError, DatasetCodec};
use crate::io::dataset::{Dataset, Element, ElementValue};

const ENTRIES: &[(&str, Tag)] = &[
    ("PatientID", Tag(0x0010, 0x0020)),
    ("PatientName", Tag(0x0010, 0x0010)),
    ("StudyDate", Tag(0x0008, 0x0020)),
    ("AccessionNumber", Tag(0x0008, 0x0050)),
];

/// Dictionary with a handful of patient/study keywords
pub struct FakeDictionary;

impl KeywordDictionary for FakeDictionary {
    fn keyword_to_tag(&self, keyword: &str) -> Option<Tag> {
        ENTRIES
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, tag)| *tag)
    }

    fn tag_to_keyword(&self, tag: Tag) -> Option<String> {
        ENTRIES
            .iter()
            .find(|(_, entry)| *entry == tag)
            .map(|(name, _)| name.to_string())
    }
}

const HEADER: &str = "#dicomsar-text";

/// Stores one element per line as `gggg,eeee|VR|value`, components split by `\`.
///
/// Files without the header line fail to decode, like non-dataset files do
/// with the real codec.
pub struct TextCodec;

impl DatasetCodec for TextCodec {
    fn decode(&self, path: &Path) -> Result<Dataset, CodecError> {
        let decode_error = |reason: String| CodecError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| decode_error(e.to_string()))?;
        let mut lines = content.lines();
        if lines.next() != Some(HEADER) {
            return Err(decode_error("missing header".to_string()));
        }

        let mut dataset = Dataset::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let mut fields = line.splitn(3, '|');
            let (Some(tag), Some(vr), Some(value)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(decode_error(format!("malformed line '{line}'")));
            };
            let tag = tag
                .split_once(',')
                .and_then(|(group, element)| parse_hex_pair(group, element))
                .ok_or_else(|| decode_error(format!("bad tag in '{line}'")))?;
            let vr = VR::from_str(vr).map_err(|_| decode_error(format!("bad VR in '{line}'")))?;

            let parts: Vec<String> = value.split('\\').map(str::to_string).collect();
            let value = match VrClass::of(vr) {
                VrClass::Numeric => ElementValue::Numeric(parts),
                VrClass::Textual if parts.len() > 1 => ElementValue::Multi(parts),
                VrClass::Textual => ElementValue::Text(value.to_string()),
                VrClass::Sequence | VrClass::Opaque => ElementValue::Opaque(value.to_string()),
            };
            let element = Element::new(tag, vr, value);
            dataset.put(match FakeDictionary.tag_to_keyword(tag) {
                Some(keyword) => element.with_keyword(keyword),
                None => element,
            });
        }
        Ok(dataset)
    }

    fn encode(&self, dataset: &Dataset, path: &Path) -> Result<(), CodecError> {
        let mut out = format!("{HEADER}\n");
        for element in dataset.elements() {
            if let ElementValue::Items(_) = element.value() {
                return Err(CodecError::Element {
                    tag: format!("{:?}", element.tag()),
                    reason: "sequences are not supported by the text codec".to_string(),
                });
            }
            out.push_str(&format!(
                "{:04x},{:04x}|{}|{}\n",
                element.tag().group(),
                element.tag().element(),
                element.vr(),
                element.value().render()
            ));
        }
        fs::write(path, out).map_err(|e| CodecError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Decodes like `TextCodec` but refuses to encode
pub struct FailingCodec;

impl DatasetCodec for FailingCodec {
    fn decode(&self, path: &Path) -> Result<Dataset, CodecError> {
        TextCodec.decode(path)
    }

    fn encode(&self, _dataset: &Dataset, path: &Path) -> Result<(), CodecError> {
        Err(CodecError::Encode {
            path: path.to_path_buf(),
            reason: "disk full".to_string(),
        })
    }
}

/// Panics on every decode
pub struct PanickingCodec;

impl DatasetCodec for PanickingCodec {
    fn decode(&self, path: &Path) -> Result<Dataset, CodecError> {
        panic!("codec blew up on {}", path.display());
    }

    fn encode(&self, _dataset: &Dataset, _path: &Path) -> Result<(), CodecError> {
        Ok(())
    }
}

/// Write a text-codec file holding the given single-valued elements.
pub fn write_text_dataset(path: &Path, elements: &[(Tag, VR, &str)]) {
    let dataset = Dataset::from_elements(
        elements
            .iter()
            .map(|(tag, vr, value)| Element::text(*tag, *vr, *value))
            .collect(),
    );
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    TextCodec.encode(&dataset, path).unwrap();
}

/// Value of `tag` in the text-codec file at `path`
pub fn read_text_value(path: &Path, tag: Tag) -> Option<String> {
    TextCodec
        .decode(path)
        .ok()?
        .get(tag)
        .map(|element| element.value().render())
}
