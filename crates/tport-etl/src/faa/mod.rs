//! FAA Releasable Aircraft source
//!
//! - [`extractor`]: fetch and unpack the registry archive
//! - [`normalizer`]: map one MASTER row to a plane record
//! - [`transformer`]: stream the MASTER file through the normalizer
//! - [`text`]: field parsing helpers shared by the above

pub mod extractor;
pub mod normalizer;
pub mod text;
pub mod transformer;

pub use extractor::{FaaExtractor, FaaFiles};
pub use normalizer::{FaaNormalizer, MasterLayout};
pub use transformer::{FaaTransformer, TransformOutput, TransformStats};
