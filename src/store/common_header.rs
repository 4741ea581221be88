//! Common file header shared across DEEPN binary files.

use std::io::{Read, Write};

use crate::error::Error;
use crate::store::binary_io::{BinaryRead, BinaryWrite};

/// DEEPN file signature: 0x89 0x44 0x50 0x4E 0x0D 0x0A 0x1A 0x0A
pub const DEEPN_SIGNATURE: u64 = 727_905_342_038_492_297;

/// File type identifier for junction database files.
pub const JUNCTION_DB_FILE_TYPE: u16 = 1;

/// Current format version for junction database files.
pub const JUNCTION_DB_FORMAT_VERSION: u16 = 1;

/// Size of signature + file type + format version.
pub const COMMON_HEADER_SIZE: usize = 8 + 2 + 2;

/// Writes the common header (signature + file type + format version) to a writer.
pub fn write_common_header<W: Write>(
    writer: &mut W,
    file_type: u16,
    format_version: u16,
) -> Result<(), Error> {
    writer.write_u64(DEEPN_SIGNATURE)?;
    writer.write_u16(file_type)?;
    writer.write_u16(format_version)?;
    Ok(())
}

/// Reads and validates the common header from a reader.
/// Returns (file_type, format_version).
pub fn read_common_header<R: Read>(reader: &mut R) -> Result<(u16, u16), Error> {
    let signature = reader.read_u64()?;
    if signature != DEEPN_SIGNATURE {
        return Err(Error::Format(format!(
            "invalid DEEPN file signature: expected {DEEPN_SIGNATURE}, got {signature}"
        )));
    }

    let file_type = reader.read_u16()?;
    let format_version = reader.read_u16()?;

    Ok((file_type, format_version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn signature_bytes() {
        let bytes = DEEPN_SIGNATURE.to_le_bytes();
        assert_eq!(bytes, [0x89, 0x44, 0x50, 0x4E, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn header_fields_read_back() {
        let mut buf = Vec::new();
        write_common_header(&mut buf, JUNCTION_DB_FILE_TYPE, JUNCTION_DB_FORMAT_VERSION).unwrap();
        assert_eq!(buf.len(), COMMON_HEADER_SIZE);

        let mut cursor = Cursor::new(buf);
        let (file_type, format_version) = read_common_header(&mut cursor).unwrap();
        assert_eq!(file_type, JUNCTION_DB_FILE_TYPE);
        assert_eq!(format_version, JUNCTION_DB_FORMAT_VERSION);
    }

    #[test]
    fn invalid_signature() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());

        let mut cursor = Cursor::new(buf);
        let result = read_common_header(&mut cursor);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid DEEPN file signature")
        );
    }
}
