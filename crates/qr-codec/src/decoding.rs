//! Модуль чтения QR-кодов с изображений
//!
//! Декодирование делегируется внешним библиотекам:
//! rqrr как основной декодер (все найденные сетки), rxing как fallback.
//! Если ничего не найдено, повторяем на инвертированном и бинаризованном кадре.

use std::collections::HashSet;
use std::path::Path;

use image::GrayImage;
use rxing::qrcode::QRCodeReader;
use rxing::{BarcodeFormat, DecodingHintDictionary, Reader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::ErrorCorrectionLevel;
use crate::preprocessing::{ImageProcessor, ProcessingConfig};

/// Ошибки чтения
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),
}

/// Декодированный QR-код
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedQR {
    /// Декодированный текст
    pub content: String,
    /// Уровень коррекции, если декодер его сообщил
    pub error_correction: Option<ErrorCorrectionLevel>,
    /// Версия QR-кода (1-40), если декодер её сообщил
    pub version: Option<u8>,
}

/// Конфигурация чтения
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Попробовать инвертированное изображение
    pub try_inverted: bool,
    /// Попробовать жёсткую бинаризацию
    pub try_threshold: bool,
    pub processing: ProcessingConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            try_inverted: true,
            try_threshold: true,
            processing: ProcessingConfig::default(),
        }
    }
}

/// Чтение QR-кодов с fallback
#[derive(Debug, Clone, Default)]
pub struct QRReader {
    config: ReaderConfig,
    processor: ImageProcessor,
}

impl QRReader {
    /// Создание читателя
    pub fn new(config: ReaderConfig) -> Self {
        let processor = ImageProcessor::new(config.processing.clone());
        Self { config, processor }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Чтение файла изображения (PNG, JPEG)
    pub fn read_file(&self, path: &Path) -> Result<Vec<DecodedQR>, ReadError> {
        log::info!("Reading QR codes from {}", path.display());
        let gray = image::open(path)?.to_luma8();
        Ok(self.read_image(&gray))
    }

    /// Чтение изображения из байтов
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<DecodedQR>, ReadError> {
        let gray = image::load_from_memory(bytes)?.to_luma8();
        Ok(self.read_image(&gray))
    }

    /// Все QR-коды на изображении; пустой результат означает, что ничего не найдено
    pub fn read_image(&self, img: &GrayImage) -> Vec<DecodedQR> {
        log::info!("Starting read_image, size: {:?}", img.dimensions());
        let prepared = self.processor.process(img);

        let found = self.decode_any(&prepared);
        if !found.is_empty() {
            return found;
        }

        if self.config.try_inverted {
            log::info!("FALLBACK: Trying inverted image...");
            let found = self.decode_any(&self.processor.invert(&prepared));
            if !found.is_empty() {
                return found;
            }
        }

        if self.config.try_threshold {
            log::info!(
                "FALLBACK: Trying contrast stretch + hard threshold ({})...",
                self.config.processing.threshold
            );
            let stretched = self.processor.stretch_contrast(&prepared);
            let found = self.decode_any(&self.processor.threshold(&stretched));
            if !found.is_empty() {
                return found;
            }
        }

        log::info!("No QR code found");
        Vec::new()
    }

    /// rqrr, затем rxing, на одном кадре
    fn decode_any(&self, img: &GrayImage) -> Vec<DecodedQR> {
        let found = self.decode_with_rqrr(img);
        if !found.is_empty() {
            return dedup(found);
        }
        self.decode_with_rxing(img).into_iter().collect()
    }

    /// Декодирование через rqrr: все найденные сетки
    fn decode_with_rqrr(&self, img: &GrayImage) -> Vec<DecodedQR> {
        log::debug!("RQRR: Starting detection on {}x{} image", img.width(), img.height());
        let (width, height) = img.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                img.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        log::debug!("RQRR: Detected {} grids", grids.len());

        grids
            .iter()
            .filter_map(|grid| match grid.decode() {
                Ok((meta, content)) => {
                    log::info!("RQRR: Decode success (version {})", meta.version.0);
                    Some(DecodedQR {
                        content,
                        error_correction: ec_level_from_format_bits(meta.ecc_level),
                        version: u8::try_from(meta.version.0).ok(),
                    })
                }
                Err(e) => {
                    log::debug!("RQRR: Decode failed: {:?}", e);
                    None
                }
            })
            .collect()
    }

    /// Декодирование через rxing: сначала HybridBinarizer, затем GlobalHistogramBinarizer
    fn decode_with_rxing(&self, img: &GrayImage) -> Option<DecodedQR> {
        log::debug!("RXING: Starting decode on {}x{} image", img.width(), img.height());
        let (width, height) = img.dimensions();

        // Формат: 0xAARRGGBB, серый повторён в каждом канале
        let pixels: Vec<u32> = img
            .as_raw()
            .iter()
            .map(|&gray| {
                let g = u32::from(gray);
                0xFF00_0000 | (g << 16) | (g << 8) | g
            })
            .collect();

        let mut hints = DecodingHintDictionary::new();
        hints.insert(
            rxing::DecodeHintType::POSSIBLE_FORMATS,
            rxing::DecodeHintValue::PossibleFormats(HashSet::from([BarcodeFormat::QR_CODE])),
        );
        hints.insert(
            rxing::DecodeHintType::TRY_HARDER,
            rxing::DecodeHintValue::TryHarder(true),
        );

        let mut reader = QRCodeReader::new();

        let source =
            rxing::RGBLuminanceSource::new_with_width_height_pixels(width as usize, height as usize, &pixels);
        let mut bitmap = rxing::BinaryBitmap::new(rxing::common::HybridBinarizer::new(source));
        if let Ok(result) = reader.decode_with_hints(&mut bitmap, &hints) {
            log::info!("RXING: Decode success (HybridBinarizer)!");
            return Some(DecodedQR {
                content: result.getText().to_string(),
                error_correction: None,
                version: None,
            });
        }

        let source =
            rxing::RGBLuminanceSource::new_with_width_height_pixels(width as usize, height as usize, &pixels);
        let mut bitmap = rxing::BinaryBitmap::new(rxing::common::GlobalHistogramBinarizer::new(source));
        match reader.decode_with_hints(&mut bitmap, &hints) {
            Ok(result) => {
                log::info!("RXING: Decode success (GlobalHistogramBinarizer)!");
                Some(DecodedQR {
                    content: result.getText().to_string(),
                    error_correction: None,
                    version: None,
                })
            }
            Err(e) => {
                log::debug!("RXING: Not found: {}", e);
                None
            }
        }
    }
}

/// Уровень по двум битам формата: 00 = M, 01 = L, 10 = H, 11 = Q
fn ec_level_from_format_bits(bits: u16) -> Option<ErrorCorrectionLevel> {
    match bits {
        0 => Some(ErrorCorrectionLevel::M),
        1 => Some(ErrorCorrectionLevel::L),
        2 => Some(ErrorCorrectionLevel::H),
        3 => Some(ErrorCorrectionLevel::Q),
        _ => None,
    }
}

/// Повторы одного и того же содержимого убираются, порядок сохраняется
fn dedup(found: Vec<DecodedQR>) -> Vec<DecodedQR> {
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|qr| seen.insert(qr.content.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_blank_image_yields_nothing() {
        let reader = QRReader::default();
        let blank = GrayImage::from_pixel(200, 200, Luma([255]));
        assert!(reader.read_image(&blank).is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let reader = QRReader::default();
        assert!(matches!(reader.read_bytes(b"not an image"), Err(ReadError::Image(_))));
    }

    #[test]
    fn test_format_bits_mapping_matches_encoder() {
        for level in ErrorCorrectionLevel::ALL {
            assert_eq!(ec_level_from_format_bits(level.format_bits() as u16), Some(level));
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let qr = |s: &str| DecodedQR {
            content: s.to_string(),
            error_correction: None,
            version: None,
        };
        let result = dedup(vec![qr("a"), qr("b"), qr("a")]);
        assert_eq!(result, vec![qr("a"), qr("b")]);
    }
}
