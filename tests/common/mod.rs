//! Synthetic JPEG files for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DATE_TIME: u16 = 0x0132;
pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const DATE_TIME_DIGITIZED: u16 = 0x9004;

/// Little-endian TIFF block with ASCII fields in IFD0 and the Exif IFD
pub fn tiff_block(image: &[(u16, &str)], exif: &[(u16, &str)]) -> Vec<u8> {
    let ifd0_len = image.len() + usize::from(!exif.is_empty());
    let exif_offset = 8 + 2 + 12 * ifd0_len + 4;
    let exif_size = if exif.is_empty() { 0 } else { 2 + 12 * exif.len() + 4 };
    let mut data_offset = exif_offset + exif_size;
    let mut data = Vec::new();

    let mut entries = |out: &mut Vec<u8>, fields: &[(u16, &str)]| {
        for (tag, value) in fields {
            let mut bytes = value.as_bytes().to_vec();
            bytes.push(0);
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&2u16.to_le_bytes());
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            if bytes.len() <= 4 {
                bytes.resize(4, 0);
                out.extend_from_slice(&bytes);
            } else {
                out.extend_from_slice(&(data_offset as u32).to_le_bytes());
                data_offset += bytes.len();
                data.extend_from_slice(&bytes);
            }
        }
    };

    let mut out = b"II".to_vec();
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    out.extend_from_slice(&(ifd0_len as u16).to_le_bytes());
    entries(&mut out, image);
    if !exif.is_empty() {
        out.extend_from_slice(&0x8769u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&(exif_offset as u32).to_le_bytes());
    }
    out.extend_from_slice(&0u32.to_le_bytes());

    if !exif.is_empty() {
        out.extend_from_slice(&(exif.len() as u16).to_le_bytes());
        entries(&mut out, exif);
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    out.extend_from_slice(&data);
    out
}

/// JPEG bytes with an optional EXIF block and `payload` as image data.
///
/// `payload` must not contain 0xFF.
pub fn jpeg_bytes(tiff: Option<&[u8]>, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    if let Some(tiff) = tiff {
        bytes.extend_from_slice(&[0xFF, 0xE1]);
        bytes.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
        bytes.extend_from_slice(b"Exif\0\0");
        bytes.extend_from_slice(tiff);
    }
    // Start of scan, so readers stop looking for EXIF here
    bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}

/// Photo taken at `date` (`YYYY:MM:DD HH:MM:SS`)
pub fn write_dated(dir: &Path, name: &str, date: &str, payload: &[u8]) -> PathBuf {
    let tiff = tiff_block(&[], &[(DATE_TIME_ORIGINAL, date)]);
    write_file(dir, name, &jpeg_bytes(Some(&tiff), payload))
}

/// Photo without any EXIF block
pub fn write_undated(dir: &Path, name: &str, payload: &[u8]) -> PathBuf {
    write_file(dir, name, &jpeg_bytes(None, payload))
}

/// Sorted file names directly inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
