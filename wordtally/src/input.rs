use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace, warn};

use crate::config::{EncodingMode, TallyConfig};
use crate::errors::{TallyError, TallyResult};

// Constants for file reading
const BUFFER_CAPACITY: usize = 65536;
pub(crate) const SMALL_FILE_THRESHOLD: u64 = 32 * 1024; // 32KB
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Options applied while turning a source file into tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOptions {
    /// Lowercase every line before splitting
    pub lowercase: bool,
    /// Invalid UTF-8 handling
    pub encoding_mode: EncodingMode,
}

impl From<&TallyConfig> for InputOptions {
    fn from(config: &TallyConfig) -> Self {
        Self {
            lowercase: config.lowercase,
            encoding_mode: config.encoding_mode,
        }
    }
}

/// Splits text into whitespace-separated tokens.
///
/// Lines are trimmed and blank lines skipped before splitting, so an empty or
/// all-blank input yields no tokens at all.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| {
            let line = if lowercase {
                Cow::Owned(line.to_lowercase())
            } else {
                Cow::Borrowed(line)
            };
            line.split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Reads `path` and returns its tokens.
///
/// Small files are read in one call, large files are memory mapped and
/// everything in between goes through a buffered reader.
pub fn read_tokens(path: &Path, options: &InputOptions) -> TallyResult<Vec<String>> {
    let size = match path.metadata() {
        Ok(metadata) => metadata.len(),
        Err(e) => return Err(TallyError::from_io(path, e)),
    };

    let tokens = if size < SMALL_FILE_THRESHOLD {
        trace!("Reading small file: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| TallyError::from_io(path, e))?;
        tokenize(&decode_bytes(&bytes, path, options.encoding_mode)?, options.lowercase)
    } else if size >= LARGE_FILE_THRESHOLD {
        trace!("Memory mapping large file: {}", path.display());
        let file = File::open(path).map_err(|e| TallyError::from_io(path, e))?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(TallyError::IoError)?;
        tokenize(&decode_bytes(&mmap, path, options.encoding_mode)?, options.lowercase)
    } else {
        trace!("Reading buffered file: {}", path.display());
        let file = File::open(path).map_err(|e| TallyError::from_io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut bytes = Vec::with_capacity(size as usize);
        reader.read_to_end(&mut bytes).map_err(TallyError::IoError)?;
        tokenize(&decode_bytes(&bytes, path, options.encoding_mode)?, options.lowercase)
    };

    debug!("Read {} tokens from {}", tokens.len(), path.display());
    Ok(tokens)
}

fn decode_bytes<'a>(
    bytes: &'a [u8],
    path: &Path,
    encoding_mode: EncodingMode,
) -> TallyResult<Cow<'a, str>> {
    match encoding_mode {
        EncodingMode::FailFast => match std::str::from_utf8(bytes) {
            Ok(valid) => Ok(Cow::Borrowed(valid)),
            Err(e) => Err(TallyError::encoding_error(path, e)),
        },
        EncodingMode::Lossy => {
            let text = String::from_utf8_lossy(bytes);
            if let Cow::Owned(_) = text {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            Ok(text)
        }
    }
}
