use super::Guid;

/// Growable little endian Unreal archive output.
///
/// Writing to memory can't fail, so none of the methods return a result.
///
/// ```
/// use palsave::{ArchiveReader, ArchiveWriter};
///
/// let mut writer = ArchiveWriter::new();
/// writer.write_fstring("Anubis");
/// writer.write_i32(-1);
/// let data = writer.into_inner();
///
/// let mut reader = ArchiveReader::new(&data);
/// assert_eq!(reader.read_fstring().unwrap(), "Anubis");
/// assert_eq!(reader.read_i32().unwrap(), -1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveWriter {
    buf: Vec<u8>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        ArchiveWriter::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ArchiveWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes this writer, returning the written bytes
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn write_u8(&mut self, data: u8) {
        self.buf.push(data);
    }

    #[inline]
    pub fn write_i32(&mut self, data: i32) {
        self.buf.extend_from_slice(&data.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, data: u32) {
        self.buf.extend_from_slice(&data.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, data: i64) {
        self.buf.extend_from_slice(&data.to_le_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, data: u64) {
        self.buf.extend_from_slice(&data.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, data: f32) {
        self.buf.extend_from_slice(&data.to_le_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, data: f64) {
        self.buf.extend_from_slice(&data.to_le_bytes());
    }

    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    #[inline]
    pub fn write_guid(&mut self, guid: &Guid) {
        self.buf.extend_from_slice(guid.as_bytes());
    }

    #[inline]
    pub fn write_optional_guid(&mut self, guid: Option<&Guid>) {
        match guid {
            Some(guid) => {
                self.write_u8(1);
                self.write_guid(guid);
            }
            None => self.write_u8(0),
        }
    }

    /// Writes a length prefixed FString.
    ///
    /// Ascii strings are written narrow, everything else as UTF-16. Both forms carry a null terminator that is counted in the
    /// length prefix. The empty string is a bare zero length.
    pub fn write_fstring(&mut self, data: &str) {
        if data.is_empty() {
            self.write_i32(0);
            return;
        }

        if data.is_ascii() {
            self.write_i32((data.len() + 1) as i32);
            self.buf.extend_from_slice(data.as_bytes());
            self.write_u8(0);
        } else {
            let wide: Vec<u16> = data.encode_utf16().collect();
            self.write_i32(-((wide.len() + 1) as i32));
            for unit in wide {
                self.buf.extend_from_slice(&unit.to_le_bytes());
            }
            self.buf.extend_from_slice(&[0, 0]);
        }
    }

    /// Writes a u32 count prefixed sequence with the given element writer
    pub fn write_tarray<T, F>(&mut self, data: &[T], mut f: F)
    where
        F: FnMut(&mut Self, &T),
    {
        self.write_u32(data.len() as u32);
        for x in data {
            f(self, x);
        }
    }

    /// Reserve room for a u64 that will be filled in with `patch_u64`
    #[inline]
    pub(crate) fn reserve_u64(&mut self) -> usize {
        let at = self.position();
        self.write_u64(0);
        at
    }

    #[inline]
    pub(crate) fn patch_u64(&mut self, at: usize, data: u64) {
        self.buf[at..at + 8].copy_from_slice(&data.to_le_bytes());
    }
}
