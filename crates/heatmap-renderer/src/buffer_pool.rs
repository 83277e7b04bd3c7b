//! Thread-local buffer pools for reducing allocation overhead.
//!
//! The draw pass needs a scratch alpha plane the size of the surface, and
//! PNG encoding needs scanline and output buffers. Instead of allocating
//! fresh `Vec`s per call, buffers are cached per-thread and reused.
//!
//! Buffers are cleared before reuse; a loaned scratch plane always starts
//! fully transparent.

use std::cell::RefCell;

// Thread-local scratch alpha plane (1 byte per pixel)
thread_local! {
    static ALPHA_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::new());
}

// Thread-local scanline buffer for PNG encoding
thread_local! {
    static SCANLINE_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::new());
}

// Thread-local PNG output buffer
thread_local! {
    static PNG_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::new());
}

/// Get a reusable scratch alpha plane.
///
/// The buffer is resized to `width * height` and filled with zeros
/// (transparent). The closure receives a mutable slice of the exact
/// required size.
#[inline]
pub fn with_alpha_buffer<F, R>(width: usize, height: usize, f: F) -> R
where
    F: FnOnce(&mut [u8]) -> R,
{
    ALPHA_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        let size = width * height;

        if buf.len() < size {
            buf.resize(size, 0);
        }
        buf[..size].fill(0);

        f(&mut buf[..size])
    })
}

/// Get a reusable scanline buffer for PNG encoding.
///
/// Sized for `height` scanlines of `1 + width * bytes_per_pixel` bytes
/// (one filter byte per line). The buffer is cleared, not zero-filled; the
/// encoder appends to it.
#[inline]
pub fn with_scanline_buffer<F, R>(width: usize, height: usize, bytes_per_pixel: usize, f: F) -> R
where
    F: FnOnce(&mut Vec<u8>) -> R,
{
    SCANLINE_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        buf.clear();

        let size = height * (1 + width * bytes_per_pixel);
        let current_cap = buf.capacity();
        if current_cap < size {
            buf.reserve(size - current_cap);
        }

        f(&mut buf)
    })
}

/// Get a reusable PNG output buffer.
#[inline]
pub fn with_png_buffer<F, R>(estimated_size: usize, f: F) -> R
where
    F: FnOnce(&mut Vec<u8>) -> R,
{
    PNG_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        buf.clear();

        let current_cap = buf.capacity();
        if current_cap < estimated_size {
            buf.reserve(estimated_size - current_cap);
        }

        f(&mut buf)
    })
}
