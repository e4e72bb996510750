//! The adapter interface shared by format-specific readers.

use super::model::Annotation;

/// A format-specific annotation file (or collection) loaded into memory.
///
/// Constructors are inherent (`from_file`), since each format needs
/// different arguments to load: a sample rate, a notated file path, and so
/// on. Only the conversion into the IR is uniform.
pub trait SeqFormat {
    /// Short name used on the command line and in reports.
    const NAME: &'static str;

    /// File extension (without the dot) this format is read from.
    const EXTENSION: &'static str;

    /// Converts the loaded file into IR annotations.
    fn to_annot(&self) -> Vec<Annotation>;
}
