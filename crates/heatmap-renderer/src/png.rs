//! PNG encoding for the colorized heatmap raster.
//!
//! A colorized heatmap draws every touched pixel from the 256-entry gradient
//! table, so the output usually fits an indexed PNG (color type 3) with a
//! tRNS entry for the untouched transparent pixels. Images that exceed 256
//! unique colors fall back to RGBA (color type 6). `create_png_auto` picks
//! the mode; `create_png` forces RGBA.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use heatmap_common::{HeatmapError, HeatmapResult};

use crate::buffer_pool::{with_png_buffer, with_scanline_buffer};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

/// Create a PNG with automatic format selection.
///
/// # Arguments
/// - `pixels`: RGBA pixel data (4 bytes per pixel)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    let num_pixels = pixels.len() / 4;

    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Pack RGBA bytes into a u32 key for hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

#[inline(always)]
fn unpack_color(packed: u32) -> [u8; 4] {
    [
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    ]
}

/// Sequential palette extraction for small rasters.
///
/// Returns the palette and one palette index per pixel, or None when the
/// image has more than 256 unique colors.
pub fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(unpack_color(packed));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger rasters.
///
/// Two passes: collect unique colors per chunk, merge; then map every pixel
/// to its palette index in parallel.
pub fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let num_pixels = pixels.len() / 4;
    let pixels_per_chunk = (num_pixels / rayon::current_num_threads()).max(256);
    let chunk_size = pixels_per_chunk * 4;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for pixel in chunk.chunks_exact(4) {
                local.insert(pack_color(pixel[0], pixel[1], pixel[2], pixel[3]), ());
                // This chunk alone already disqualifies the image
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);

    for packed in unique_colors {
        if !color_to_index.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            color_to_index.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let mut indices = vec![0u8; num_pixels];
    indices
        .par_chunks_mut(pixels_per_chunk)
        .enumerate()
        .for_each(|(chunk_idx, idx_chunk)| {
            let pixel_start = chunk_idx * pixels_per_chunk * 4;
            for (i, idx) in idx_chunk.iter_mut().enumerate() {
                let offset = pixel_start + i * 4;
                let packed = pack_color(
                    pixels[offset],
                    pixels[offset + 1],
                    pixels[offset + 2],
                    pixels[offset + 3],
                );
                *idx = color_to_index.get(&packed).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
///
/// 1 byte per pixel instead of 4; the palette's alpha values are carried in
/// a tRNS chunk when any entry is not fully opaque (the untouched pixels of
/// a heatmap are transparent).
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> HeatmapResult<Vec<u8>> {
    with_png_buffer(height * (1 + width) / 4 + 256, |png| {
        // PNG signature
        png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

        write_ihdr(png, width, height, 3);

        // PLTE chunk
        let mut plte_data = Vec::with_capacity(palette.len() * 3);
        for [r, g, b, _] in palette {
            plte_data.push(*r);
            plte_data.push(*g);
            plte_data.push(*b);
        }
        write_chunk(png, b"PLTE", &plte_data);

        // tRNS chunk - only if any color has alpha < 255
        let has_transparency = palette.iter().any(|[_, _, _, a]| *a < 255);
        if has_transparency {
            let trns_data: Vec<u8> = palette.iter().map(|[_, _, _, a]| *a).collect();
            write_chunk(png, b"tRNS", &trns_data);
        }

        // IDAT chunk
        let idat_data = deflate_scanlines(indices, width, height, 1)?;
        write_chunk(png, b"IDAT", &idat_data);

        write_chunk(png, b"IEND", &[]);

        Ok(png.clone())
    })
}

/// Create a PNG from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    with_png_buffer(height * (1 + width * 4) / 4 + 64, |png| {
        // PNG signature
        png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

        write_ihdr(png, width, height, 6);

        let idat_data = deflate_scanlines(pixels, width, height, 4)?;
        write_chunk(png, b"IDAT", &idat_data);

        write_chunk(png, b"IEND", &[]);

        Ok(png.clone())
    })
}

/// Write the IHDR chunk for an 8-bit image of the given color type.
fn write_ihdr(png: &mut Vec<u8>, width: usize, height: usize, color_type: u8) {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(png, b"IHDR", &ihdr_data);
}

/// Filter (type 0 per scanline) and deflate image data for the IDAT chunk.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> HeatmapResult<Vec<u8>> {
    with_scanline_buffer(width, height, bytes_per_pixel, |uncompressed| {
        let stride = width * bytes_per_pixel;
        for y in 0..height {
            uncompressed.push(0); // filter type: none
            let row_start = y * stride;
            uncompressed.extend_from_slice(&data[row_start..row_start + stride]);
        }

        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder
            .write_all(uncompressed)
            .map_err(|e| HeatmapError::PngError(format!("IDAT compression failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| HeatmapError::PngError(format!("IDAT compression failed: {}", e)))
    })
}

/// Write a PNG chunk: length, type, data, CRC.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
