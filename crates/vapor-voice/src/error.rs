use vapor_native::VoiceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("voice interface has not been initialized")]
    NotInitialized,

    /// Recording has stopped and all buffered voice has been read.
    #[error("voice recording has stopped")]
    NotRecording,

    #[error("buffer too small for the available voice data")]
    BufferTooSmall,

    #[error("voice data has been corrupted")]
    DataCorrupted,

    #[error("user is chat restricted")]
    Restricted,

    #[error("unknown voice error ({0:?})")]
    Unknown(VoiceResult),
}

impl VoiceError {
    /// `Ok(())` for the results that carry data or an empty read.
    pub(crate) fn check(result: VoiceResult) -> Result<(), Self> {
        match result {
            VoiceResult::Ok | VoiceResult::NoData => Ok(()),
            VoiceResult::NotInitialized => Err(Self::NotInitialized),
            VoiceResult::NotRecording => Err(Self::NotRecording),
            VoiceResult::BufferTooSmall => Err(Self::BufferTooSmall),
            VoiceResult::DataCorrupted => Err(Self::DataCorrupted),
            VoiceResult::Restricted => Err(Self::Restricted),
            other => Err(Self::Unknown(other)),
        }
    }

    /// Whether this marks the end of a recording rather than a failure.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::NotRecording)
    }
}

/// Decoding stopped with an error after producing some output.
///
/// The decoder may have written samples before it failed; they are kept
/// here rather than thrown away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("voice decoding failed after {} samples: {kind}", .partial.len())]
pub struct DecompressError {
    kind: VoiceError,
    partial: Vec<i16>,
}

impl DecompressError {
    pub(crate) fn new(kind: VoiceError, partial: Vec<i16>) -> Self {
        Self { kind, partial }
    }

    pub fn kind(&self) -> VoiceError {
        self.kind
    }

    /// Samples decoded before the failure. Often empty.
    pub fn partial(&self) -> &[i16] {
        &self.partial
    }

    pub fn into_partial(self) -> Vec<i16> {
        self.partial
    }
}

impl From<DecompressError> for VoiceError {
    fn from(err: DecompressError) -> Self {
        err.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_no_data_is_ok() {
        assert_eq!(VoiceError::check(VoiceResult::NoData), Ok(()));
        assert_eq!(VoiceError::check(VoiceResult::Ok), Ok(()));
    }

    #[test]
    fn test_check_maps_failures() {
        assert_eq!(
            VoiceError::check(VoiceResult::DataCorrupted),
            Err(VoiceError::DataCorrupted)
        );
        assert_eq!(
            VoiceError::check(VoiceResult::UnsupportedCodec),
            Err(VoiceError::Unknown(VoiceResult::UnsupportedCodec))
        );
    }

    #[test]
    fn test_not_recording_is_end_of_stream() {
        assert!(VoiceError::NotRecording.is_end_of_stream());
        assert!(!VoiceError::Restricted.is_end_of_stream());
    }

    #[test]
    fn test_decompress_error_keeps_partial_output() {
        let err = DecompressError::new(VoiceError::DataCorrupted, vec![4, 5]);
        assert_eq!(err.kind(), VoiceError::DataCorrupted);
        assert_eq!(err.partial(), &[4, 5]);
        assert_eq!(
            err.to_string(),
            "voice decoding failed after 2 samples: voice data has been corrupted"
        );
        assert_eq!(VoiceError::from(err.clone()), VoiceError::DataCorrupted);
        assert_eq!(err.into_partial(), vec![4, 5]);
    }
}
