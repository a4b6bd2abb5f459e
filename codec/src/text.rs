// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Fixed-width text fields.

use crate::Error;

/// Interpret raw bytes as fixed-width text.
///
/// The specs mandate printable ASCII, space padded on the right; modules in
/// the field do not always comply, so non-UTF-8 bytes are replaced rather
/// than failing the read. No trimming happens here: the caller sees the
/// field's full declared width.
pub fn text(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}

/// Render `value` into a field of `capacity` bytes, space padded, the
/// write-side mirror of [`text`].
pub fn set_text(capacity: usize, value: &str) -> Result<Vec<u8>, Error> {
    if value.len() > capacity {
        return Err(Error::TextTooLong {
            len: value.len(),
            capacity,
        });
    }
    let mut out = vec![b' '; capacity];
    out[..value.len()].copy_from_slice(value.as_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::set_text;
    use super::text;
    use super::Error;

    #[test]
    fn test_text_preserves_padding() {
        assert_eq!(text(b"ACME OPTICS     "), "ACME OPTICS     ");
        assert_eq!(text(b""), "");
    }

    #[test]
    fn test_text_tolerates_non_utf8() {
        let decoded = text(&[0x41, 0xFF, 0x42]);
        assert!(decoded.starts_with('A'));
        assert!(decoded.ends_with('B'));
    }

    #[test]
    fn test_set_text() {
        assert_eq!(set_text(8, "ACME").unwrap(), b"ACME    ".to_vec());
        assert_eq!(set_text(4, "ACME").unwrap(), b"ACME".to_vec());
        assert_eq!(
            set_text(2, "ACME").unwrap_err(),
            Error::TextTooLong { len: 4, capacity: 2 }
        );
    }
}
