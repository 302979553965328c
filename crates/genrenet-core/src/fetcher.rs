//! # Dataset Fetcher
//!
//! Retrieves a compressed resource through a [`Transport`], decompresses it
//! and writes the result into the cache.
//!
//! The transport is the only network seam of the core: the crate defines the
//! trait, the app layer implements it over HTTP, tests implement it in memory.
//!
//! A fetch either leaves complete decompressed content at the destination or
//! fails and leaves the destination untouched. Content is decompressed into
//! a `<destination>.part` file that is renamed onto the destination only
//! after the decoder reached the end of the stream.

use crate::dataset::DatasetHandle;
use crate::primitives::PARTIAL_SUFFIX;
use crate::GenreNetError;
use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// Fetch the raw (compressed) bytes of a named resource.
///
/// Implementations must return `GenreNetError::Transport` naming the
/// resource and the status whenever the remote call does not indicate
/// success. Returning an empty body for a failed call is not allowed.
pub trait Transport {
    fn get(&self, handle: &DatasetHandle) -> Result<Vec<u8>, GenreNetError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, handle: &DatasetHandle) -> Result<Vec<u8>, GenreNetError> {
        (**self).get(handle)
    }
}

// =============================================================================
// FETCHER
// =============================================================================

/// Decompressing fetcher over a transport.
#[derive(Debug, Clone)]
pub struct DatasetFetcher<T: Transport> {
    transport: T,
}

impl<T: Transport> DatasetFetcher<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch `handle` into its own cache path. Returns that path.
    pub fn fetch(&self, handle: &DatasetHandle) -> Result<PathBuf, GenreNetError> {
        self.fetch_to(handle, handle.cache_path())?;
        Ok(handle.cache_path().to_path_buf())
    }

    /// Fetch `handle` into `destination`.
    pub fn fetch_to(&self, handle: &DatasetHandle, destination: &Path) -> Result<(), GenreNetError> {
        let compressed = self.transport.get(handle)?;

        let partial = partial_path(destination);
        if let Err(e) = decompress_into(handle, &compressed, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        fs::rename(&partial, destination).map_err(|e| {
            let _ = fs::remove_file(&partial);
            GenreNetError::Io(format!(
                "Move '{}' into {}: {}",
                handle.name(),
                destination.display(),
                e
            ))
        })
    }
}

/// `<path>.part`
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn decompress_into(
    handle: &DatasetHandle,
    compressed: &[u8],
    path: &Path,
) -> Result<(), GenreNetError> {
    let io_err = |e: std::io::Error| {
        GenreNetError::Io(format!("Write '{}' to {}: {}", handle.name(), path.display(), e))
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut decoder = MultiGzDecoder::new(compressed);
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let read = decoder.read(&mut buffer).map_err(|e| GenreNetError::Decode {
            resource: handle.name().to_string(),
            reason: e.to_string(),
        })?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read]).map_err(io_err)?;
    }

    writer.flush().map_err(io_err)?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Resource;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    struct StaticTransport(Result<Vec<u8>, u16>);

    impl Transport for StaticTransport {
        fn get(&self, handle: &DatasetHandle) -> Result<Vec<u8>, GenreNetError> {
            self.0.clone().map_err(|status| GenreNetError::Transport {
                resource: handle.name().to_string(),
                status: format!("HTTP {}", status),
            })
        }
    }

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(text.as_bytes()).expect("encode");
        encoder.finish().expect("finish")
    }

    fn handle(dir: &Path) -> DatasetHandle {
        DatasetHandle::standard(Resource::Ratings, "https://example.test", dir)
    }

    #[test]
    fn fetch_writes_decompressed_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let handle = handle(dir.path());
        let fetcher = DatasetFetcher::new(StaticTransport(Ok(gzip("tconst\taverageRating\n"))));

        let path = fetcher.fetch(&handle).expect("fetch");
        assert_eq!(path, handle.cache_path());
        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "tconst\taverageRating\n");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn transport_failure_leaves_destination_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let handle = handle(dir.path());
        fs::write(handle.cache_path(), "old").expect("seed");
        let fetcher = DatasetFetcher::new(StaticTransport(Err(503)));

        let err = fetcher.fetch(&handle).expect_err("must fail");
        assert!(matches!(err, GenreNetError::Transport { .. }));
        assert!(err.to_string().contains("ratings"));
        assert!(err.to_string().contains("503"));
        assert_eq!(fs::read_to_string(handle.cache_path()).expect("read"), "old");
    }

    #[test]
    fn corrupt_payload_is_decode_error_without_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let handle = handle(dir.path());
        let fetcher = DatasetFetcher::new(StaticTransport(Ok(b"definitely not gzip".to_vec())));

        let err = fetcher.fetch(&handle).expect_err("must fail");
        assert!(matches!(err, GenreNetError::Decode { .. }));
        assert!(!handle.cache_path().exists());
        assert!(!partial_path(handle.cache_path()).exists());
    }
}
