//! Transfer engine
//!
//! Turns one logical full-duplex transfer into a sequence of bounded
//! backend exchanges, applying software bit reversal on both sides of the
//! wire when the handle emulates LSB-first.

use crate::backend::SpiBackend;
use crate::config::{SpiConfig, DEFAULT_MAX_TRANSFER_SIZE};
use crate::error::{Error, Result};
use crate::reverse::{reverse_in_place, reverse_into};
use alloc::borrow::Cow;
use alloc::vec::Vec;

/// Derive the per-exchange chunk size from a backend's advertised maximum
///
/// Zero falls back to the Linux default; the result is also capped by the
/// kernel's 32-bit length field.
pub fn chunk_size(max_transfer_size: u64) -> usize {
    let max = if max_transfer_size == 0 {
        DEFAULT_MAX_TRANSFER_SIZE
    } else {
        max_transfer_size
    };
    let max = max.min(u64::from(u32::MAX));
    usize::try_from(max).unwrap_or(usize::MAX)
}

/// Allocate a zeroed buffer of `len` bytes without aborting on failure
pub fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| Error::AllocFailed)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Run one logical transfer on an open channel
///
/// `read` must be exactly as long as `write`. On failure the contents of
/// `read` are unspecified: chunks that completed before the failing one may
/// or may not be present.
pub fn run<B: SpiBackend>(
    backend: &B,
    channel: &mut B::Channel,
    config: &SpiConfig,
    chunk_size: usize,
    write: &[u8],
    read: &mut [u8],
) -> Result<()> {
    if read.len() != write.len() {
        return Err(Error::InvalidArgument);
    }
    if write.is_empty() {
        return Ok(());
    }

    let outbound: Cow<'_, [u8]> = if config.sw_lsb_first {
        let mut reversed = alloc_buffer(write.len())?;
        reverse_into(&mut reversed, write);
        Cow::Owned(reversed)
    } else {
        Cow::Borrowed(write)
    };

    exchange_chunked(backend, channel, config, chunk_size, &outbound, read)?;

    if config.sw_lsb_first {
        reverse_in_place(read);
    }

    Ok(())
}

fn exchange_chunked<B: SpiBackend>(
    backend: &B,
    channel: &mut B::Channel,
    config: &SpiConfig,
    chunk_size: usize,
    write: &[u8],
    read: &mut [u8],
) -> Result<()> {
    let chunk_size = chunk_size.max(1);
    let chunks = write.len().div_ceil(chunk_size);
    log::trace!(
        "transfer: {} bytes in {} chunk(s) of up to {} bytes",
        write.len(),
        chunks,
        chunk_size
    );

    for (i, (tx, rx)) in write
        .chunks(chunk_size)
        .zip(read.chunks_mut(chunk_size))
        .enumerate()
    {
        backend.exchange(channel, config, tx, rx).map_err(|e| {
            log::debug!("transfer: chunk {}/{} failed: {}", i + 1, chunks, e);
            Error::TransferFailed
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(0), 4096);
        assert_eq!(chunk_size(1), 1);
        assert_eq!(chunk_size(65536), 65536);
        assert!(chunk_size(u64::MAX) <= u32::MAX as usize);
    }

    #[test]
    fn test_alloc_buffer() {
        let buf = alloc_buffer(10).unwrap();
        assert_eq!(buf.len(), 10);
        assert!(buf.iter().all(|&b| b == 0));
        assert!(alloc_buffer(0).unwrap().is_empty());
    }
}
