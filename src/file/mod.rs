//! file — доступ к байтам файла таблицы (File Data Provider).
//!
//! Два режима, выбираемые при open:
//! - mmap     — весь файл [0, file_size) мапится один раз (mmap_data_if_needed); чтения — срезы
//!              маппинга без копирования. Маппинг не пересоздаётся до закрытия ридера.
//! - buffered — позиционные чтения (pread / seek_read) в собственные буферы; общего курсора у
//!              файла нет, поэтому параллельные итераторы не требуют блокировок.
//!
//! Кодек записей и итератор видят только трейт DataSource и не знают, какой режим активен.

use log::debug;
use memmap2::{Mmap, MmapOptions};
use std::borrow::Cow;
use std::fs::File;
use std::io;

use crate::error::{Result, TableError};
use crate::metrics::record_buffered_read;

/// Единая возможность «прочитать len байт по смещению offset».
///
/// Выход за пределы источника — Corruption (никогда не паника и не чтение за границей).
pub trait DataSource {
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>>;
}

impl DataSource for [u8] {
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let end = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(len).map(|end| (start, end)))
            .filter(|&(_, end)| end <= self.len());
        match end {
            Some((start, end)) => Ok(Cow::Borrowed(&self[start..end])),
            None => Err(TableError::corruption(format!(
                "read [{}..+{}) past end of buffer ({} bytes)",
                offset,
                len,
                self.len()
            ))),
        }
    }
}

impl DataSource for File {
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let mut buf = vec![0u8; len];
        if len > 0 {
            pread_exact(self, &mut buf, offset).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    TableError::corruption(format!("short read [{}..+{}): {}", offset, len, e))
                } else {
                    TableError::from(e)
                }
            })?;
            record_buffered_read(len as u64);
        }
        Ok(Cow::Owned(buf))
    }
}

#[cfg(unix)]
fn pread_exact(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn pread_exact(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                let rest = buf;
                buf = &mut rest[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Представление файла для ридера: режим, маппинг (если есть) и граница data region.
/// Владеет файловым хэндлом; итераторы и Get держат только ссылку.
#[derive(Debug)]
pub struct FileInfo {
    pub(crate) is_mmap_mode: bool,
    pub(crate) file: File,
    pub(crate) file_size: u64,
    pub(crate) mmap: Option<Mmap>,
    /// Авторитетная верхняя граница сканов (из properties.data_size, не из размера файла).
    pub(crate) data_end_offset: u64,
}

impl FileInfo {
    pub fn new(file: File, file_size: u64, data_end_offset: u64, is_mmap_mode: bool) -> Self {
        Self {
            is_mmap_mode,
            file,
            file_size,
            mmap: None,
            data_end_offset,
        }
    }

    /// В mmap режиме замапить весь файл; в buffered — ничего не делать.
    pub fn mmap_data_if_needed(&mut self) -> Result<()> {
        if !self.is_mmap_mode || self.mmap.is_some() {
            return Ok(());
        }
        let on_disk = self.file.metadata()?.len();
        if on_disk < self.file_size {
            return Err(TableError::corruption(format!(
                "file is {} bytes on disk, expected at least {}",
                on_disk, self.file_size
            )));
        }
        let len = usize::try_from(self.file_size).map_err(|_| {
            TableError::not_supported(format!("file of {} bytes cannot be mapped", self.file_size))
        })?;
        let map = unsafe { MmapOptions::new().offset(0).len(len).map(&self.file) }?;
        debug!("mmap_data_if_needed: mapped {} bytes", len);
        self.mmap = Some(map);
        Ok(())
    }

    #[inline]
    pub fn is_mmap_mode(&self) -> bool {
        self.is_mmap_mode
    }

    /// Замапленный образ файла (только в mmap режиме после open).
    #[inline]
    pub fn mapped(&self) -> Option<&[u8]> {
        self.mmap.as_deref()
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    #[inline]
    pub fn data_end_offset(&self) -> u64 {
        self.data_end_offset
    }

    /// Подсказка ядру о последовательном чтении (best-effort, только mmap).
    pub fn advise_sequential(&self) {
        if let Some(map) = &self.mmap {
            advise_sequential_map(map);
        }
    }
}

#[cfg(unix)]
fn advise_sequential_map(map: &Mmap) {
    if let Err(e) = map.advise(memmap2::Advice::Sequential) {
        debug!("advise_sequential: madvise failed: {}", e);
    }
}

#[cfg(not(unix))]
fn advise_sequential_map(_map: &Mmap) {}

impl DataSource for FileInfo {
    #[inline]
    fn read_at(&self, offset: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        match &self.mmap {
            Some(map) => map[..].read_at(offset, len),
            None => DataSource::read_at(&self.file, offset, len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_ID: AtomicU64 = AtomicU64::new(1);

    fn temp_file_with(bytes: &[u8]) -> (PathBuf, File) {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "rtreetable-file-{}-{}.bin",
            std::process::id(),
            id
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        f.sync_all().unwrap();
        (path.clone(), File::open(&path).unwrap())
    }

    #[test]
    fn slice_source_bounds() {
        let buf = [1u8, 2, 3, 4];
        assert_eq!(&*buf[..].read_at(1, 2).unwrap(), &[2, 3]);
        assert_eq!(buf[..].read_at(4, 0).unwrap().len(), 0);
        assert!(buf[..].read_at(3, 2).unwrap_err().is_corruption());
        assert!(buf[..].read_at(u64::MAX, 1).unwrap_err().is_corruption());
    }

    #[test]
    fn mmap_and_buffered_read_same_bytes() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let (path, f1) = temp_file_with(&bytes);
        let f2 = File::open(&path).unwrap();

        let mut mm = FileInfo::new(f1, bytes.len() as u64, 200, true);
        mm.mmap_data_if_needed().unwrap();
        let buffered = FileInfo::new(f2, bytes.len() as u64, 200, false);

        assert!(mm.mapped().is_some());
        assert!(buffered.mapped().is_none());
        let a = mm.read_at(10, 20).unwrap();
        let b = buffered.read_at(10, 20).unwrap();
        assert!(matches!(a, Cow::Borrowed(_)));
        assert!(matches!(b, Cow::Owned(_)));
        assert_eq!(&*a, &*b);

        assert!(buffered.read_at(250, 10).unwrap_err().is_corruption());
        assert!(mm.read_at(250, 10).unwrap_err().is_corruption());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn mmap_refuses_declared_size_beyond_disk() {
        let (path, f) = temp_file_with(&[0u8; 64]);
        let mut info = FileInfo::new(f, 4096, 0, true);
        assert!(info.mmap_data_if_needed().unwrap_err().is_corruption());
        let _ = std::fs::remove_file(path);
    }
}
