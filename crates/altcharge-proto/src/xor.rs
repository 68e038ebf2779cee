//! Single-byte XOR obfuscation used on heartbeat payloads.
//!
//! Every payload byte is XORed with the low byte of the frame's sequence
//! number. Applying the same key twice restores the input.

/// Key byte for a sequence number: its low 8 bits.
pub fn key_for(sequence_number: u64) -> u8 {
    (sequence_number & 0xFF) as u8
}

/// Return `data` with every byte XORed with `key`.
pub fn apply(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|byte| byte ^ key).collect()
}

/// XOR every byte of `data` with `key` in place.
pub fn apply_in_place(data: &mut [u8], key: u8) {
    for byte in data {
        *byte ^= key;
    }
}
