use crate::error::DecodeError;

/// Reassembles UTF-8 text from byte reads that may split a character.
///
/// Up to three trailing bytes of an incomplete sequence are carried into
/// the next read.
#[derive(Debug, Default)]
pub(crate) struct Utf8Assembler {
    carry: Vec<u8>,
    /// Bytes already converted, for error offsets.
    offset: usize,
}

impl Utf8Assembler {
    /// Convert the carried bytes plus `bytes` into text, holding back an
    /// incomplete trailing sequence.
    ///
    /// Text before an invalid sequence is still returned, alongside the
    /// error, so units it completes are not lost.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> (String, Option<DecodeError>) {
        self.carry.extend_from_slice(bytes);
        let (valid, error) = match std::str::from_utf8(&self.carry) {
            Ok(_) => (self.carry.len(), None),
            Err(e) if e.error_len().is_none() => (e.valid_up_to(), None),
            Err(e) => (
                e.valid_up_to(),
                Some(DecodeError::InvalidUtf8 {
                    offset: self.offset + e.valid_up_to(),
                }),
            ),
        };
        let text = String::from_utf8_lossy(&self.carry[..valid]).into_owned();
        self.carry.drain(..valid);
        self.offset += valid;
        (text, error)
    }

    /// Check that the input did not end inside a character.
    pub(crate) fn finish(&self) -> Result<(), DecodeError> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::InvalidUtf8 {
                offset: self.offset,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_character_is_carried() {
        let bytes = "é✓".as_bytes();
        let mut assembler = Utf8Assembler::default();
        assert_eq!(assembler.push(&bytes[..1]).0, "");
        assert_eq!(assembler.push(&bytes[1..3]).0, "é");
        assert_eq!(assembler.push(&bytes[3..]).0, "✓");
        assert!(assembler.finish().is_ok());
    }

    #[test]
    fn invalid_byte_reports_offset() {
        let mut assembler = Utf8Assembler::default();
        assert_eq!(assembler.push(b"abc").0, "abc");
        let (text, error) = assembler.push(b"d\xffe");
        assert_eq!(text, "d");
        assert!(matches!(error, Some(DecodeError::InvalidUtf8 { offset: 4 })));
    }

    #[test]
    fn dangling_sequence_at_end_is_an_error() {
        let mut assembler = Utf8Assembler::default();
        let (text, error) = assembler.push(&"✓".as_bytes()[..2]);
        assert!(text.is_empty() && error.is_none());
        assert!(matches!(
            assembler.finish(),
            Err(DecodeError::InvalidUtf8 { offset: 0 })
        ));
    }
}
