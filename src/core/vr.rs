//! Value-representation rules: length limits and the category each VR falls into.
use dicom::core::VR;

/// What kind of value a VR encodes
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum VrClass {
    /// Character data
    Textual,
    /// Binary-encoded integers and floats
    Numeric,
    /// Nested datasets
    Sequence,
    /// Bulk bytes, pixel data, attribute tags and unknowns
    Opaque,
}

impl VrClass {
    pub fn of(vr: VR) -> Self {
        match vr {
            VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UC
            | VR::UI
            | VR::UR
            | VR::UT => VrClass::Textual,
            VR::US | VR::SS | VR::UL | VR::SL | VR::FL | VR::FD | VR::UV | VR::SV => {
                VrClass::Numeric
            }
            VR::SQ => VrClass::Sequence,
            _ => VrClass::Opaque,
        }
    }
}

/// The fixed set of string-like VRs rewritten when no tag filter is given.
pub fn is_string_like(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UI
            | VR::UR
    )
}

/// Maximum encoded length in bytes, if the VR defines one.
pub fn max_length(vr: VR) -> Option<usize> {
    let limit = match vr {
        VR::AE => 16,
        VR::AS => 4,
        VR::CS => 16,
        VR::DA => 8,
        VR::DS => 16,
        VR::DT => 26,
        VR::IS => 12,
        VR::LO => 64,
        VR::LT => 10240,
        VR::PN => 64,
        VR::SH => 16,
        VR::ST => 1024,
        VR::TM => 16,
        VR::UI => 64,
        VR::UR | VR::UT => 4_294_967_294,
        _ => return None,
    };
    Some(limit)
}

/// Returns false iff `vr` has a maximum length and `value` exceeds it.
pub fn validate(value: &str, vr: VR) -> bool {
    match max_length(vr) {
        Some(limit) => value.len() <= limit,
        None => true,
    }
}

/// Whether `value` can be stored in a binary numeric VR.
pub fn parses_as_numeric(value: &str, vr: VR) -> bool {
    let value = value.trim();
    match vr {
        VR::US => value.parse::<u16>().is_ok(),
        VR::SS => value.parse::<i16>().is_ok(),
        VR::UL => value.parse::<u32>().is_ok(),
        VR::SL => value.parse::<i32>().is_ok(),
        VR::UV => value.parse::<u64>().is_ok(),
        VR::SV => value.parse::<i64>().is_ok(),
        VR::FL => value.parse::<f32>().is_ok(),
        VR::FD => value.parse::<f64>().is_ok(),
        _ => false,
    }
}
