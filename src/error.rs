//! error — типизированные ошибки ридера таблиц.
//!
//! Таксономия:
//! - InvalidFormat — чужой/неподдерживаемый файл (magic, версия, компаратор).
//! - Corruption    — повреждённые данные (обрезанный файл, CRC, выход за data region, ключ).
//! - Io            — ошибка позиционного чтения или mmap.
//! - NotSupported  — обратная итерация.
//!
//! Ошибка клонируемая: итератор хранит последний статус и отдаёт его копией.

use std::io;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("invalid table format: {0}")]
    InvalidFormat(String),

    #[error("corruption: {0}")]
    Corruption(String),

    #[error("io error: {0}")]
    Io(Arc<io::Error>),

    #[error("not supported: {0}")]
    NotSupported(String),
}

impl TableError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        TableError::InvalidFormat(msg.into())
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        TableError::Corruption(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        TableError::NotSupported(msg.into())
    }

    #[inline]
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, TableError::InvalidFormat(_))
    }

    #[inline]
    pub fn is_corruption(&self) -> bool {
        matches!(self, TableError::Corruption(_))
    }

    #[inline]
    pub fn is_io(&self) -> bool {
        matches!(self, TableError::Io(_))
    }

    #[inline]
    pub fn is_not_supported(&self) -> bool {
        matches!(self, TableError::NotSupported(_))
    }
}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        TableError::Io(Arc::new(e))
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
