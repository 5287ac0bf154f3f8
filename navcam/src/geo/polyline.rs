//! Encoded-polyline decoding.
//!
//! Decodes the Google encoded-polyline format used by routing APIs to ship
//! step geometry. Both common precisions are supported: 5 (classic) and 6
//! (the default for modern directions responses).

use thiserror::Error;

use super::GeoPoint;

/// Errors that can occur while decoding an encoded polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// A byte outside the valid encoding alphabet was encountered.
    #[error("invalid polyline character {character:?} at byte {index}")]
    InvalidCharacter { character: char, index: usize },

    /// The input ended in the middle of a coordinate.
    #[error("polyline truncated at byte {0}")]
    Truncated(usize),
}

/// Decode an encoded polyline into geographic points.
///
/// # Arguments
///
/// * `encoded` - The encoded polyline string
/// * `precision` - Decimal digits of coordinate precision (5 or 6 in
///   practice; any value up to 7 is accepted)
///
/// # Errors
///
/// Returns [`PolylineError`] if the string contains bytes outside the
/// encoding alphabet or ends mid-coordinate. An empty string decodes to an
/// empty point list.
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<GeoPoint>, PolylineError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();

    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        lat += decode_component(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(PolylineError::Truncated(index));
        }
        lon += decode_component(bytes, &mut index)?;

        points.push(GeoPoint::new(lat as f64 / factor, lon as f64 / factor));
    }

    Ok(points)
}

/// Decode a single zigzag/varint coordinate delta, advancing `index`.
fn decode_component(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut shift = 0u32;
    let mut result: u64 = 0;

    loop {
        if *index >= bytes.len() {
            return Err(PolylineError::Truncated(*index));
        }
        let byte = bytes[*index];
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                index: *index,
            });
        }
        *index += 1;

        let chunk = (byte - 63) as u64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            // A coordinate delta can never need this many chunks.
            return Err(PolylineError::InvalidCharacter {
                character: byte as char,
                index: *index - 1,
            });
        }
    }

    // Zigzag decode.
    let value = if result & 1 == 1 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };
    Ok(value)
}
