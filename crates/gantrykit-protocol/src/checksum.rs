//! CRC-8/Maxim checksum
//!
//! The controller appends a single check byte to every frame, computed over
//! the command-id byte and the payload bytes only. The sync and length bytes
//! are never included. The algorithm is the Maxim/iButton 1-Wire CRC-8
//! variant: reflected polynomial 0x31 (0x8C reflected), initial value 0x00,
//! bits processed least-significant first.

/// Compute the CRC-8/Maxim check value over `data`.
///
/// Pure and deterministic. The standard check value holds:
/// `crc8_maxim(b"123456789") == 0xA1`.
pub fn crc8_maxim(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        let mut current = byte;
        for _ in 0..8 {
            let mix = (crc ^ current) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            current >>= 1;
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_check_value() {
        // Standard CRC-8/MAXIM check string
        assert_eq!(crc8_maxim(b"123456789"), 0xA1);
    }

    #[test]
    fn test_empty_and_single_bytes() {
        assert_eq!(crc8_maxim(&[]), 0x00);
        assert_eq!(crc8_maxim(&[0x00]), 0x00);
        assert_eq!(crc8_maxim(&[0x01]), 0x5E);
        assert_eq!(crc8_maxim(&[0xD5]), 0x68);
    }

    #[test]
    fn test_multi_byte() {
        assert_eq!(crc8_maxim(&[0x00, 0x01, 0x02, 0x03]), 0xD8);
    }

    proptest! {
        #[test]
        fn test_deterministic(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(crc8_maxim(&data), crc8_maxim(&data));
        }

        #[test]
        fn test_single_bit_flip_detected(
            data in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<proptest::sample::Index>(),
            bit in 0u8..8,
        ) {
            let byte = index.index(data.len());
            let mut flipped = data.clone();
            flipped[byte] ^= 1u8 << bit;
            // An 8-bit CRC detects every single-bit error
            prop_assert_ne!(crc8_maxim(&data), crc8_maxim(&flipped));
        }
    }
}
