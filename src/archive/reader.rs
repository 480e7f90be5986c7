use super::Guid;
use crate::{util::get_split, Error, ErrorKind};
use std::convert::TryFrom;

/// A zero-copy cursor over little endian Unreal archive data.
///
/// Every read advances the cursor and reports the offset of the failure when
/// there isn't enough data left.
///
/// ```
/// use palsave::ArchiveReader;
///
/// let data = [0x05, 0x00, 0x00, 0x00, b'P', b'a', b'l', b's', 0x00, 0x2a];
/// let mut reader = ArchiveReader::new(&data);
/// assert_eq!(reader.read_fstring().unwrap(), "Pals");
/// assert_eq!(reader.read_u8().unwrap(), 42);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    original_length: usize,
    canonical: bool,
}

impl<'a> ArchiveReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            original_length: data.len(),
            canonical: true,
        }
    }

    /// The bytes that have yet to be read
    #[inline]
    pub fn remainder(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.original_length - self.data.len()
    }

    /// Number of bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Returns true when every byte has been consumed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True while every value read so far is stored the way
    /// [`ArchiveWriter`](crate::ArchiveWriter) writes it, so re-encoding
    /// reproduces the input bytes exactly.
    ///
    /// ```
    /// use palsave::ArchiveReader;
    ///
    /// // an empty string that still carries its terminator
    /// let mut reader = ArchiveReader::new(&[0x01, 0x00, 0x00, 0x00, 0x00]);
    /// assert_eq!(reader.read_fstring().unwrap(), "");
    /// assert!(!reader.is_canonical());
    /// ```
    #[inline]
    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Enforce that the blob described by `discriminator` has been fully
    /// consumed.
    #[inline]
    pub fn finish(&self, discriminator: &str) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::trailing(discriminator, self.remaining()))
        }
    }

    #[inline]
    fn read_n<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let (head, rest) = get_split::<N>(self.data).ok_or_else(|| Error::eof(self.position()))?;
        self.data = rest;
        Ok(head)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let (&first, rest) = self
            .data
            .split_first()
            .ok_or_else(|| Error::eof(self.position()))?;
        self.data = rest;
        Ok(first)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.read_n::<4>().map(i32::from_le_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read_n::<4>().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.read_n::<8>().map(i64::from_le_bytes)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.read_n::<8>().map(u64::from_le_bytes)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_n::<4>().map(f32::from_le_bytes)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_n::<8>().map(f64::from_le_bytes)
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        self.read_n::<N>()
    }

    /// Borrow the next `len` bytes
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if len > self.data.len() {
            return Err(Error::eof(self.position()));
        }

        let (head, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(head)
    }

    /// Borrow everything that hasn't been read yet
    #[inline]
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let rest = self.data;
        self.data = &[];
        rest
    }

    /// Split off the next `len` bytes into their own cursor
    #[inline]
    pub fn sub_reader(&mut self, len: usize) -> Result<ArchiveReader<'a>, Error> {
        self.read_bytes(len).map(ArchiveReader::new)
    }

    #[inline]
    pub fn read_guid(&mut self) -> Result<Guid, Error> {
        self.read_n::<16>().map(Guid::from_bytes)
    }

    /// A guid preceded by a one byte presence flag
    #[inline]
    pub fn read_optional_guid(&mut self) -> Result<Option<Guid>, Error> {
        if self.read_u8()? != 0 {
            self.read_guid().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads a length prefixed FString.
    ///
    /// A positive length denotes a null terminated narrow string, a negative
    /// length a null terminated UTF-16 string of that many code units. Narrow
    /// bytes are read as latin-1.
    pub fn read_fstring(&mut self) -> Result<String, Error> {
        let offset = self.position();
        let size = self.read_i32()?;
        if size == 0 {
            return Ok(String::new());
        }

        if size > 0 {
            let data = self.read_bytes(size as usize)?;
            let text = match data.strip_suffix(&[0]) {
                Some(text) if !text.is_empty() && text.is_ascii() => text,
                Some(text) => {
                    self.canonical = false;
                    text
                }
                None => {
                    self.canonical = false;
                    data
                }
            };
            return Ok(text.iter().map(|&b| char::from(b)).collect());
        }

        let units = size.unsigned_abs() as usize;
        let byte_len = units.checked_mul(2).ok_or_else(|| {
            Error::new(ErrorKind::InvalidLength {
                offset,
                len: i64::from(size),
            })
        })?;

        let data = self.read_bytes(byte_len)?;
        let mut wide: Vec<u16> = data
            .chunks_exact(2)
            .map(|x| u16::from_le_bytes([x[0], x[1]]))
            .collect();

        let terminated = wide.last() == Some(&0);
        if terminated {
            wide.pop();
        }

        let result = String::from_utf16(&wide)
            .map_err(|_| Error::new(ErrorKind::InvalidString { offset }))?;

        // ascii text, including the empty string, is written narrow
        if !terminated || result.is_ascii() {
            self.canonical = false;
        }

        Ok(result)
    }

    /// Reads a u32 boolean. Any non-zero value is true.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        let value = self.read_u32()?;
        if value > 1 {
            self.canonical = false;
        }
        Ok(value != 0)
    }

    /// Reads a u32 element count
    #[inline]
    pub fn read_len(&mut self) -> Result<usize, Error> {
        self.read_u32().map(|x| x as usize)
    }

    /// Reads an i32 element count, rejecting negative values
    #[inline]
    pub fn read_signed_len(&mut self) -> Result<usize, Error> {
        let offset = self.position();
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| {
            Error::new(ErrorKind::InvalidLength {
                offset,
                len: i64::from(len),
            })
        })
    }

    /// Reads a u32 count prefixed sequence with the given element reader
    pub fn read_tarray<T, F>(&mut self, f: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(&mut Self) -> Result<T, Error>,
    {
        let len = self.read_len()?;
        self.read_elements(len, f)
    }

    pub(crate) fn read_elements<T, F>(&mut self, len: usize, mut f: F) -> Result<Vec<T>, Error>
    where
        F: FnMut(&mut Self) -> Result<T, Error>,
    {
        // a corrupt count shouldn't translate into a giant allocation
        let mut result = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            result.push(f(self)?);
        }
        Ok(result)
    }
}
