#![allow(dead_code)]

use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage};
use png_jpg_converter_lib::{progress_channel, BatchRunner, ConversionJob, ProgressEvent, RunOutcome, StartResponse};
use std::fs;
use std::path::Path;

pub fn write_rgba(path: &Path, width: u32, height: u32, pixel: Rgba<u8>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbaImage::from_pixel(width, height, pixel).save(path).unwrap();
}

pub fn write_rgb(path: &Path, width: u32, height: u32, pixel: Rgb<u8>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, pixel).save(path).unwrap();
}

// 8-byte signature, then IHDR: length(4) + type(4) + data(13) + crc(4)
const IHDR_END: usize = 8 + 4 + 4 + 13 + 4;
const COLOR_TYPE_OFFSET: usize = 8 + 4 + 4 + 9;

fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);

    let mut out = Vec::with_capacity(data.len() + 12);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
    out
}

/// Insert ancillary chunks right after `IHDR`, in the given order.
pub fn insert_chunks(path: &Path, chunks: &[(&[u8; 4], &[u8])]) {
    let png = fs::read(path).unwrap();
    assert_eq!(&png[12..16], b"IHDR");

    let mut out = png[..IHDR_END].to_vec();
    for (kind, data) in chunks {
        out.extend_from_slice(&chunk(kind, data));
    }
    out.extend_from_slice(&png[IHDR_END..]);
    fs::write(path, out).unwrap();
}

/// Insert an `eXIf` chunk carrying `orientation`.
pub fn add_exif_orientation(path: &Path, orientation: u16) {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\0\x2a");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());
    insert_chunks(path, &[(b"eXIf", &tiff)]);
}

/// Write an 8-bit RGB PNG whose `key` color is marked transparent by `tRNS`.
pub fn write_color_keyed(path: &Path, width: u32, height: u32, key: Rgb<u8>) {
    write_rgb(path, width, height, key);
    let trns = [0, key[0], 0, key[1], 0, key[2]];
    insert_chunks(path, &[(b"tRNS", &trns)]);
}

/// Write an 8-bit palette PNG. `indices` picks a palette entry per pixel and
/// `alpha` gives the `tRNS` alpha of the leading palette entries.
///
/// Gray 8-bit scanlines and palette 8-bit scanlines share a layout, so the
/// image is saved as gray and its IHDR retagged as color type 3.
pub fn write_indexed(path: &Path, width: u32, indices: &[u8], palette: &[[u8; 3]], alpha: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let height = indices.len() as u32 / width;
    GrayImage::from_raw(width, height, indices.to_vec()).unwrap().save(path).unwrap();

    let mut png = fs::read(path).unwrap();
    assert_eq!(png[COLOR_TYPE_OFFSET], 0);
    png[COLOR_TYPE_OFFSET] = 3;
    let ihdr = chunk(b"IHDR", &png[16..29]);
    png[8..IHDR_END].copy_from_slice(&ihdr);
    fs::write(path, png).unwrap();

    let plte: Vec<u8> = palette.iter().flatten().copied().collect();
    insert_chunks(path, &[(b"PLTE", &plte), (b"tRNS", alpha)]);
}

/// Run `job` to completion and return its outcome with every event it sent.
pub fn run_job(job: ConversionJob) -> (StartResponse, Option<RunOutcome>, Vec<ProgressEvent>) {
    let (tx, mut rx) = progress_channel();
    let runner = BatchRunner::new(tx);
    let response = runner.start_run(job);
    let outcome = runner.wait();
    (response, outcome, rx.drain())
}

pub fn close(a: u8, b: u8, tolerance: u8) -> bool {
    a.abs_diff(b) <= tolerance
}
