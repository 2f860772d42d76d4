//! Conversion artifacts returned by the backend.

/// Standard MIDI file header chunk tag.
const MIDI_HEADER: &[u8; 4] = b"MThd";

/// The binary result of a successful conversion.
#[derive(Clone)]
pub struct Artifact {
    bytes: Vec<u8>,
    digest: blake3::Hash,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        let digest = blake3::hash(&bytes);
        Self { bytes, digest }
    }

    /// Raw artifact bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// BLAKE3 digest, hex encoded. Used to correlate log lines.
    pub fn digest_hex(&self) -> String {
        self.digest.to_hex().to_string()
    }

    /// Whether the payload starts with a MIDI header chunk.
    ///
    /// Some backends fall back to MusicXML when MIDI export fails.
    pub fn looks_like_midi(&self) -> bool {
        self.bytes.starts_with(MIDI_HEADER)
    }
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("bytes", &self.bytes.len())
            .field("digest", &self.digest.to_hex().as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_detection() {
        let midi = Artifact::new(vec![0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06]);
        assert!(midi.looks_like_midi());

        let xml = Artifact::new(b"<?xml version=\"1.0\"?>".to_vec());
        assert!(!xml.looks_like_midi());
    }

    #[test]
    fn test_digest_is_stable() {
        let a = Artifact::new(b"MThd".to_vec());
        let b = Artifact::new(b"MThd".to_vec());
        assert_eq!(a.digest_hex(), b.digest_hex());
        assert_eq!(a.digest_hex().len(), 64);
    }
}
