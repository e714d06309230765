//! Rendering helpers for tags and element values in dump and change output.
use dicom::core::value::{PrimitiveValue, Value};
use dicom::core::{Tag, VR};

pub const MAX_VALUE_LEN: usize = 120;

pub fn format_tag(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.group(), tag.element())
}

/// Cut `rendered` down to `MAX_VALUE_LEN` characters, marking the cut.
pub fn truncate(rendered: &str) -> String {
    if rendered.chars().count() > MAX_VALUE_LEN {
        let mut truncated = rendered.chars().take(MAX_VALUE_LEN).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        rendered.to_string()
    }
}

/// Short description of a value that is not edited as text.
pub fn summarize_value<I, P>(value: &Value<I, P>, vr: VR) -> String {
    match value {
        Value::Primitive(primitive) => summarize_primitive(primitive, vr),
        Value::Sequence(sequence) => {
            let count = sequence.items().len();
            let suffix = if count == 1 { "" } else { "s" };
            format!("Sequence ({count} item{suffix})")
        }
        Value::PixelSequence(sequence) => {
            let fragments = sequence.fragments().len();
            let fragment_suffix = if fragments == 1 { "" } else { "s" };
            let offset_entries = sequence.offset_table().len();
            if offset_entries > 0 {
                let offset_suffix = if offset_entries == 1 { "" } else { "s" };
                format!(
                    "Pixel data ({fragments} fragment{fragment_suffix}, offset table {offset_entries} entry{offset_suffix})"
                )
            } else {
                format!("Pixel data ({fragments} fragment{fragment_suffix})")
            }
        }
    }
}

fn summarize_primitive(value: &PrimitiveValue, vr: VR) -> String {
    match value {
        PrimitiveValue::Empty => "(empty)".to_string(),
        PrimitiveValue::Tags(values) => values
            .iter()
            .map(|tag| format_tag(*tag))
            .collect::<Vec<_>>()
            .join("\\"),
        _ if is_binary_vr(vr) => format!("Binary data ({} bytes)", value.calculate_byte_len()),
        _ => truncate(&value.to_str()),
    }
}

pub fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}
