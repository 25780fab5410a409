use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Byte sink a document is streamed into.
///
/// Appending goes through [`Write`]. The two extra operations back the
/// multi-writer merge: one writer reads another's finished bytes and splices
/// them into its own sink, then the source is thrown away.
pub trait Sink: Write {
    /// Everything written so far. The write position is left where it was.
    fn read_contents(&mut self) -> io::Result<Vec<u8>>;

    /// Drop the sink and whatever it holds.
    fn discard(self) -> io::Result<()>
    where
        Self: Sized;
}

/// File-backed sink, opened for both reading and writing.
#[derive(Debug)]
pub struct FileSink {
    file: File,
    path: PathBuf,
}

impl FileSink {
    /// Create or truncate `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Sink for FileSink {
    fn read_contents(&mut self) -> io::Result<Vec<u8>> {
        self.file.flush()?;
        let end = self.file.stream_position()?;
        self.file.seek(SeekFrom::Start(0))?;

        let mut buf = Vec::with_capacity(end as usize);
        let read = (&mut self.file).take(end).read_to_end(&mut buf);
        // restore the cursor even if the read failed
        self.file.seek(SeekFrom::Start(end))?;
        read?;
        Ok(buf)
    }

    fn discard(self) -> io::Result<()> {
        let FileSink { file, path } = self;
        drop(file);
        fs::remove_file(path)
    }
}

impl Sink for Cursor<Vec<u8>> {
    fn read_contents(&mut self) -> io::Result<Vec<u8>> {
        let end = (self.position() as usize).min(self.get_ref().len());
        Ok(self.get_ref()[..end].to_vec())
    }

    fn discard(self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for Vec<u8> {
    fn read_contents(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn discard(self) -> io::Result<()> {
        Ok(())
    }
}
