//! Allow-list of declared media types accepted for upload.

use crate::media::{CandidateFile, MediaType};
use serde::{Deserialize, Serialize};

/// The set of declared media types the conversion service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    types: Vec<MediaType>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            types: vec![MediaType::JPEG, MediaType::PNG, MediaType::PDF],
        }
    }
}

impl AllowList {
    /// Creates an allow-list from the given types, dropping duplicates.
    pub fn new(types: impl IntoIterator<Item = MediaType>) -> Self {
        let mut unique: Vec<MediaType> = Vec::new();
        for ty in types {
            if !unique.contains(&ty) {
                unique.push(ty);
            }
        }
        Self { types: unique }
    }

    /// Images only, for endpoints that cannot handle PDF input.
    pub fn images_only() -> Self {
        Self {
            types: vec![MediaType::JPEG, MediaType::PNG],
        }
    }

    /// The accepted types, in order.
    pub fn types(&self) -> &[MediaType] {
        &self.types
    }

    /// Whether the declared type is accepted.
    pub fn permits(&self, media_type: &MediaType) -> bool {
        self.types.contains(media_type)
    }

    /// Checks a candidate file against the list.
    pub fn check(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        if self.permits(file.media_type()) {
            return Ok(());
        }

        Err(ValidationError::UnsupportedType {
            name: file.name().to_string(),
            found: file.media_type().clone(),
            accepted: self.describe(),
        })
    }

    /// Human-readable list of accepted types, e.g. "JPEG image, PNG image or PDF document".
    pub fn describe(&self) -> String {
        let names: Vec<String> = self.types.iter().map(|t| t.describe().into_owned()).collect();
        match names.split_last() {
            None => "nothing".to_string(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}

/// Reasons a candidate file is refused before upload.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("{name} has unsupported type `{found}`; please upload a {accepted}")]
    UnsupportedType {
        name: String,
        found: MediaType,
        accepted: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(name: &str, media_type: MediaType) -> CandidateFile {
        CandidateFile::new(name, media_type, vec![0u8; 4])
    }

    #[test]
    fn test_default_accepts_images_and_pdf() {
        let allow = AllowList::default();
        assert!(allow.check(&candidate("photo.png", MediaType::PNG)).is_ok());
        assert!(allow.check(&candidate("scan.jpg", MediaType::JPEG)).is_ok());
        assert!(allow.check(&candidate("score.pdf", MediaType::PDF)).is_ok());
    }

    #[test]
    fn test_plain_text_rejected_with_accepted_names() {
        let allow = AllowList::default();
        let err = allow
            .check(&candidate("notes.txt", MediaType::PLAIN_TEXT))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("text/plain"));
        assert!(message.contains("JPEG image, PNG image or PDF document"));
    }

    #[test]
    fn test_images_only_rejects_pdf() {
        let allow = AllowList::images_only();
        assert!(matches!(
            allow.check(&candidate("score.pdf", MediaType::PDF)),
            Err(ValidationError::UnsupportedType { .. })
        ));
        assert_eq!(allow.describe(), "JPEG image or PNG image");
    }

    #[test]
    fn test_new_drops_duplicates() {
        let allow = AllowList::new([MediaType::PNG, MediaType::new("image/png")]);
        assert_eq!(allow.types().len(), 1);
        assert_eq!(allow.describe(), "PNG image");
    }

    proptest! {
        #[test]
        fn test_unlisted_types_always_rejected(mime in "[a-z]{1,12}/[a-z0-9.+-]{1,20}") {
            let allow = AllowList::default();
            let ty = MediaType::new(mime);
            prop_assume!(!allow.types().contains(&ty));
            prop_assert!(allow.check(&candidate("input", ty)).is_err());
        }
    }
}
