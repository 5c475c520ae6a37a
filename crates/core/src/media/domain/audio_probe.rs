use std::path::Path;

/// Domain interface for measuring an audio file's length.
pub trait AudioProbe: Send {
    /// Duration in seconds. Implementations return an error rather than a
    /// zero, negative or non-finite value.
    fn duration(&self, path: &Path) -> Result<f64, Box<dyn std::error::Error>>;
}
