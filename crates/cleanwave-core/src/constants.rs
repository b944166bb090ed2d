//! Naming constants shared by the storage, processing and handler crates.

/// Directory (under the scratch root) holding the writable model asset copy.
pub const MODEL_SCRATCH_DIR_NAME: &str = "deepfilter_models";

/// Directory (under the scratch root) holding per-invocation audio files.
pub const INVOCATION_SCRATCH_DIR_NAME: &str = "cleanwave";

/// Path segment inserted between the owner id and the enhanced filename.
pub const ENHANCED_KEY_SEGMENT: &str = "enhanced";

/// Prefix added to the stem of every enhanced output filename.
pub const ENHANCED_FILENAME_PREFIX: &str = "enhanced_";

/// Content type of the delivered file.
pub const ENHANCED_CONTENT_TYPE: &str = "audio/mpeg";

/// Sample rate assumed when the model assets do not declare one.
pub const DEFAULT_MODEL_SAMPLE_RATE: u32 = 48_000;
