//! This module contains basic base64 functionality as used in Hawk.

use base64::engine::{general_purpose, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// BEWIT_ENGINE encodes to a url-safe value with no padding, and refuses to
/// decode padded input.  Non-zero trailing bits are ignored when decoding.
pub(crate) const BEWIT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// STANDARD_ENGINE encodes with the standard alphabet and includes padding.
/// MACs, payload hashes and `tsm` values all use this encoding.
pub(crate) const STANDARD_ENGINE: GeneralPurpose = general_purpose::STANDARD;

#[cfg(test)]
mod test {
    use super::*;
    use base64::Engine;

    #[test]
    fn test_bewit_engine_is_url_safe() {
        assert_eq!(BEWIT_ENGINE.encode([0xfb, 0xff]), "-_8");
        assert!(BEWIT_ENGINE.decode("-_8=").is_err());
    }

    #[test]
    fn test_standard_engine_pads() {
        assert_eq!(STANDARD_ENGINE.encode([0xfb, 0xff]), "+/8=");
    }
}
