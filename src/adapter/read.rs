use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::GithubFs;
use crate::filesystem::FsError;
use crate::github::Description;

/// Strictly decodes a base64 payload as delivered by the contents API.
///
/// Line breaks inserted by the transport are ignored; any other character
/// outside the alphabet is an error.
pub(crate) fn decode_content(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .collect();
    STANDARD.decode(compact)
}

impl GithubFs {
    pub(super) fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let file = match self.describe(path)? {
            Description::File(file) => file,
            Description::Directory(_) => {
                return Err(FsError::UnableToRead {
                    path: path.to_string(),
                    reason: "path is a directory".to_string(),
                });
            }
        };

        if let Some(encoding) = file.encoding.as_deref() {
            if encoding != "base64" {
                return Err(FsError::UnableToRead {
                    path: path.to_string(),
                    reason: format!("unsupported content encoding '{}'", encoding),
                });
            }
        }

        let content = file.content.ok_or_else(|| FsError::UnableToRead {
            path: path.to_string(),
            reason: "no content in response".to_string(),
        })?;

        decode_content(&content).map_err(|source| FsError::InvalidEncoding {
            path: path.to_string(),
            source,
        })
    }
}
