//! I/O layer: file discovery, the dataset model, the DICOM codec adapter, and
//! rendering helpers for dump and change output.
pub mod codec;
pub mod dataset;
pub mod discover;
pub mod formatting;

pub use codec::{CodecError, DatasetCodec, DicomCodec};
pub use dataset::{Dataset, Element, ElementValue};
pub use discover::discover_files;
