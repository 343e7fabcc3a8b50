//! I/O abstraction layer.
//!
//! Streams are registered in an [`IoRegistry`] keyed by a runtime-assigned
//! descriptor. The registry has no weak-reference eviction: handlers stay
//! registered until they are explicitly closed, and closing unregisters them
//! (the close path is the eviction rule). Stream values carry the descriptor
//! in their payload, so a value that outlives its stream simply stops
//! resolving.

use std::io::{Read, Seek, SeekFrom, Write};
use std::os::fd::AsRawFd;

use nacre_core::value::FastHashMap;
use nacre_core::value::fast_map_new;

use crate::errors::messages::{STREAM_CLOSED, UNKNOWN_DESCRIPTOR};

pub trait Stream {
    fn read_to_string(&mut self) -> Result<String, String>;
    fn write(&mut self, data: &[u8]) -> Result<usize, String>;
    fn flush(&mut self) -> Result<(), String>;
    fn close(&mut self) -> Result<(), String>;
    /// Rewind/seek support is optional; unseekable streams report an error.
    fn seek_to(&mut self, _pos: u64) -> Result<u64, String> {
        Err("Stream is not seekable".to_string())
    }
    fn is_tty(&self) -> bool {
        false
    }
}

/// Growable in-memory stream; reads consume from the current position.
pub struct MemoryStream {
    buf: Vec<u8>,
    pos: usize,
    open: bool,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            open: true,
        }
    }

    pub fn with_content(content: &str) -> Self {
        Self {
            buf: content.as_bytes().to_vec(),
            pos: 0,
            open: true,
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for MemoryStream {
    fn read_to_string(&mut self) -> Result<String, String> {
        if !self.open {
            return Err(STREAM_CLOSED.to_string());
        }
        let rest = &self.buf[self.pos.min(self.buf.len())..];
        let out = String::from_utf8_lossy(rest).into_owned();
        self.pos = self.buf.len();
        Ok(out)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, String> {
        if !self.open {
            return Err(STREAM_CLOSED.to_string());
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), String> {
        if !self.open {
            return Err(STREAM_CLOSED.to_string());
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        self.open = false;
        Ok(())
    }

    fn seek_to(&mut self, pos: u64) -> Result<u64, String> {
        if !self.open {
            return Err(STREAM_CLOSED.to_string());
        }
        self.pos = (pos as usize).min(self.buf.len());
        Ok(self.pos as u64)
    }
}

/// File-backed stream.
pub struct FileStream {
    file: Option<std::fs::File>,
    path: String,
}

impl FileStream {
    pub fn open(path: &str) -> Result<Self, String> {
        let file = std::fs::File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            file: Some(file),
            path: path.to_string(),
        })
    }

    fn file_mut(&mut self) -> Result<&mut std::fs::File, String> {
        self.file
            .as_mut()
            .ok_or_else(|| format!("{}: {}", STREAM_CLOSED, self.path))
    }
}

impl Stream for FileStream {
    fn read_to_string(&mut self) -> Result<String, String> {
        let mut out = String::new();
        self.file_mut()?
            .read_to_string(&mut out)
            .map_err(|e| e.to_string())?;
        Ok(out)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, String> {
        self.file_mut()?.write(data).map_err(|e| e.to_string())
    }

    fn flush(&mut self) -> Result<(), String> {
        self.file_mut()?.flush().map_err(|e| e.to_string())
    }

    fn close(&mut self) -> Result<(), String> {
        // dropping the handle closes the descriptor
        self.file = None;
        Ok(())
    }

    fn seek_to(&mut self, pos: u64) -> Result<u64, String> {
        self.file_mut()?
            .seek(SeekFrom::Start(pos))
            .map_err(|e| e.to_string())
    }

    fn is_tty(&self) -> bool {
        match &self.file {
            Some(f) => unsafe { libc::isatty(f.as_raw_fd()) == 1 },
            None => false,
        }
    }
}

/// Descriptor -> handler table with an explicit unregister-on-close protocol.
pub struct IoRegistry {
    handlers: FastHashMap<i64, Box<dyn Stream>>,
    next_fd: i64,
}

impl IoRegistry {
    pub fn new() -> Self {
        Self {
            handlers: fast_map_new(),
            next_fd: 3, // 0..2 are conventionally reserved
        }
    }

    pub fn register(&mut self, stream: Box<dyn Stream>) -> i64 {
        let fd = self.next_fd;
        self.next_fd += 1;
        self.handlers.insert(fd, stream);
        log::debug!("io: registered stream fd={}", fd);
        fd
    }

    pub fn get_mut(&mut self, fd: i64) -> Result<&mut Box<dyn Stream>, String> {
        self.handlers
            .get_mut(&fd)
            .ok_or_else(|| format!("{}: {}", UNKNOWN_DESCRIPTOR, fd))
    }

    pub fn contains(&self, fd: i64) -> bool {
        self.handlers.contains_key(&fd)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn read_to_string(&mut self, fd: i64) -> Result<String, String> {
        self.get_mut(fd)?.read_to_string()
    }

    pub fn write(&mut self, fd: i64, data: &[u8]) -> Result<usize, String> {
        self.get_mut(fd)?.write(data)
    }

    /// Closes the handler and removes it from the table.
    pub fn close(&mut self, fd: i64) -> Result<(), String> {
        let mut stream = self
            .handlers
            .remove(&fd)
            .ok_or_else(|| format!("{}: {}", UNKNOWN_DESCRIPTOR, fd))?;
        stream.close()?;
        log::debug!("io: closed stream fd={}", fd);
        Ok(())
    }

    /// Closes everything still registered; used at runtime teardown.
    pub fn close_all(&mut self) -> usize {
        let fds: Vec<i64> = self.handlers.keys().copied().collect();
        let mut closed = 0;
        for fd in fds {
            if self.close(fd).is_ok() {
                closed += 1;
            }
        }
        closed
    }
}

impl Default for IoRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_stream_round_trip() {
        let mut s = MemoryStream::new();
        s.write(b"hello ").unwrap();
        s.write(b"world").unwrap();
        s.seek_to(0).unwrap();
        assert_eq!(s.read_to_string().unwrap(), "hello world");
        // position consumed; nothing left
        assert_eq!(s.read_to_string().unwrap(), "");
    }

    #[test]
    fn registry_close_unregisters() {
        let mut io = IoRegistry::new();
        let fd = io.register(Box::new(MemoryStream::new()));
        assert!(io.contains(fd));
        io.close(fd).unwrap();
        assert!(!io.contains(fd));
        assert!(io.close(fd).is_err());
    }

    #[test]
    fn close_all_drains_registry() {
        let mut io = IoRegistry::new();
        io.register(Box::new(MemoryStream::new()));
        io.register(Box::new(MemoryStream::new()));
        assert_eq!(io.close_all(), 2);
        assert!(io.is_empty());
    }
}
