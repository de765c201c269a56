//! QR Codec - кодирование, растеризация и чтение QR-кодов
//!
//! Библиотека с поддержкой:
//! - Кодирования по ISO/IEC 18004 (версии 1-40, уровни L/M/Q/H, маски 0-7)
//! - Растеризации в изображение с тихой зоной и сохранения в PNG
//! - Чтения QR с изображений через rqrr с fallback на rxing

pub mod bits;
pub mod canvas;
pub mod decoding;
pub mod encoder;
pub mod metadata;
pub(crate) mod penalty;
pub mod preprocessing;
pub mod reed_solomon;
pub mod render;
pub mod segment;
pub mod symbol;
pub mod tables;

pub use decoding::{DecodedQR, QRReader, ReadError, ReaderConfig};
pub use encoder::{encode, encode_with_mask, fit_version, EncodeError, Encoder, EncoderConfig};
pub use metadata::{ErrorCorrectionLevel, MaskPattern, Mode, ParseError, Version};
pub use preprocessing::{ImageProcessor, ProcessingConfig};
pub use render::{to_terminal_string, RenderConfig, RenderError, Renderer};
pub use symbol::Symbol;
pub use tables::{data_capacity_bits, max_payload_len};

use std::path::Path;

use thiserror::Error;

/// Основные ошибки модуля
#[derive(Error, Debug)]
pub enum QRError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Invalid parameter: {0}")]
    Parse(#[from] ParseError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Read error: {0}")]
    Read(#[from] ReadError),
}

/// Набор кодер + растеризатор + читатель с общей конфигурацией
#[derive(Debug, Clone, Default)]
pub struct QRToolkit {
    encoder: Encoder,
    renderer: Renderer,
    reader: QRReader,
}

impl QRToolkit {
    /// Создание с пользовательскими настройками
    pub fn with_config(encoder: EncoderConfig, render: RenderConfig, reader: ReaderConfig) -> Self {
        Self {
            encoder: Encoder::new(encoder),
            renderer: Renderer::new(render),
            reader: QRReader::new(reader),
        }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn reader(&self) -> &QRReader {
        &self.reader
    }

    /// Генерация символа из текста
    pub fn generate(
        &self,
        text: &str,
        version: Version,
        ec_level: ErrorCorrectionLevel,
    ) -> Result<Symbol, QRError> {
        let symbol = self.encoder.encode(text.as_bytes(), version, ec_level)?;
        log::info!(
            "Generated {}x{} symbol, version {}-{}, mask {}",
            symbol.size(),
            symbol.size(),
            symbol.version(),
            symbol.ec_level(),
            symbol.mask()
        );
        Ok(symbol)
    }

    /// Сохранение символа в PNG
    pub fn save(&self, symbol: &Symbol, path: &Path) -> Result<(), QRError> {
        Ok(self.renderer.save_png(symbol, path)?)
    }

    /// Чтение всех QR-кодов из файла
    pub fn read_file(&self, path: &Path) -> Result<Vec<DecodedQR>, QRError> {
        Ok(self.reader.read_file(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolkit_generate_reports_capacity() {
        let toolkit = QRToolkit::default();
        let err = toolkit
            .generate("this text does not fit", Version::MIN, ErrorCorrectionLevel::H)
            .unwrap_err();
        assert!(matches!(err, QRError::Encode(EncodeError::CapacityExceeded { .. })));
    }

    #[test]
    fn test_toolkit_fit_config() {
        let toolkit = QRToolkit::with_config(
            EncoderConfig {
                fit_version: true,
                mask: None,
            },
            RenderConfig::default(),
            ReaderConfig::default(),
        );
        let symbol = toolkit
            .generate("this text does not fit", Version::MIN, ErrorCorrectionLevel::H)
            .unwrap();
        assert!(symbol.version() > Version::MIN);
    }
}
