/// Default number of extra field-1 sub-message levels the decoder descends.
pub const DEFAULT_MAX_NESTING: usize = 1;

/// Controls heartbeat decoding fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// When a heartbeat payload yields no known field after XOR decryption,
    /// retry it as plaintext. Default: true.
    pub heartbeat_plaintext_fallback: bool,
    /// When a command-response payload yields no known field as plaintext,
    /// retry it XOR-decrypted. Default: false.
    pub response_xor_fallback: bool,
    /// Extra levels of field-1 sub-messages merged into the result.
    pub max_nesting: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            heartbeat_plaintext_fallback: true,
            response_xor_fallback: false,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}
