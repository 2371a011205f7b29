use std::fs;
use std::io::{self, Read};
use std::path::Path;

use evql_compiler::SourceKind;

/// Raw input bytes plus where they came from.
pub struct Input {
    pub bytes: Vec<u8>,
    pub kind: SourceKind,
}

#[cfg(test)]
impl Input {
    pub fn inline(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
            kind: SourceKind::Inline,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error("failed to read '{path}': {source}")]
    File { path: String, source: io::Error },
}

/// Read `path`, or stdin when `path` is `-`.
pub fn load_input(path: &Path) -> Result<Input, InputError> {
    if path.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(InputError::Stdin)?;
        return Ok(Input {
            bytes,
            kind: SourceKind::Stdin,
        });
    }

    let shown = path.to_string_lossy().into_owned();
    let bytes = fs::read(path).map_err(|source| InputError::File {
        path: shown.clone(),
        source,
    })?;
    tracing::debug!(path = %shown, bytes = bytes.len(), "read input");
    Ok(Input {
        bytes,
        kind: SourceKind::File(shown),
    })
}
