use crate::error::{BundleError, BundleResult};
use crate::safety::ArcName;
use std::io::{Read, Seek, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// ZIP writer with pinned entry metadata.
///
/// - fixed timestamps (DOS epoch, 1980-01-01)
/// - deflate level 9 for files
/// - 0o755 directories, 0o644 files
/// - empty archive comment
///
/// Entries are written in the order they are added.
pub struct BundleWriter<W: Write + Seek> {
    zw: ZipWriter<W>,
    base_opts: SimpleFileOptions,
}

impl<W: Write + Seek> BundleWriter<W> {
    pub fn new(inner: W) -> BundleResult<Self> {
        let fixed_time = zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0).map_err(|_| {
            BundleError::InvalidInput("failed to create fixed zip datetime".to_string())
        })?;
        let base_opts = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9))
            .last_modified_time(fixed_time);
        Ok(Self {
            zw: ZipWriter::new(inner),
            base_opts,
        })
    }

    pub fn add_directory(&mut self, name: &ArcName) -> BundleResult<()> {
        let opts = self.base_opts.unix_permissions(0o755);
        self.zw
            .add_directory(name.as_dir().to_string(), opts)
            .map_err(|e| BundleError::Zip(e.to_string()))
    }

    /// Streams `reader` into a new file entry and returns the bytes copied.
    pub fn add_stream<R: Read + ?Sized>(
        &mut self,
        name: &ArcName,
        reader: &mut R,
    ) -> BundleResult<u64> {
        if name.is_dir() {
            return Err(BundleError::unsafe_name(
                name.as_str(),
                "directory name used for a file entry",
            ));
        }
        let opts = self.base_opts.unix_permissions(0o644);
        self.zw
            .start_file(name.to_string(), opts)
            .map_err(|e| BundleError::Zip(e.to_string()))?;
        Ok(std::io::copy(reader, &mut self.zw)?)
    }

    pub fn add_bytes(&mut self, name: &ArcName, bytes: &[u8]) -> BundleResult<u64> {
        let mut r = bytes;
        self.add_stream(name, &mut r)
    }

    pub fn finish(mut self) -> BundleResult<W> {
        self.zw.set_comment("");
        self.zw
            .finish()
            .map_err(|e| BundleError::Zip(e.to_string()))
    }
}
