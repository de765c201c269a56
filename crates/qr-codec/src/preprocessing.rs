//! Модуль предобработки изображений перед чтением QR
//!
//! Функции для повышения шанса распознавания внешними декодерами:
//! - Уменьшение слишком больших изображений
//! - Добавление светлой тихой зоны вокруг кадра
//! - Инверсия, растяжение контраста, жёсткая бинаризация

use image::{imageops, GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Конфигурация предобработки
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Максимальная сторона изображения в пикселях
    pub max_dimension: u32,
    /// Ширина добавляемой светлой рамки в пикселях
    pub pad_quiet_zone: u32,
    /// Порог жёсткой бинаризации (0-255)
    pub threshold: u8,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1000,
            pad_quiet_zone: 16,
            threshold: 128,
        }
    }
}

/// Процессор изображений
#[derive(Debug, Clone, Default)]
pub struct ImageProcessor {
    config: ProcessingConfig,
}

impl ImageProcessor {
    /// Создание процессора с конфигурацией
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Базовая подготовка: ресайз и рамка
    pub fn process(&self, img: &GrayImage) -> GrayImage {
        let resized = self.resize(img, self.config.max_dimension);
        self.pad(&resized, self.config.pad_quiet_zone)
    }

    /// Светлая рамка заданной ширины
    pub fn pad(&self, img: &GrayImage, margin: u32) -> GrayImage {
        if margin == 0 {
            return img.clone();
        }
        let (width, height) = img.dimensions();
        let mut result = GrayImage::from_pixel(width + 2 * margin, height + 2 * margin, Luma([255]));
        imageops::replace(&mut result, img, i64::from(margin), i64::from(margin));
        result
    }

    /// Инвертирование изображения (для QR с инвертированными цветами)
    pub fn invert(&self, img: &GrayImage) -> GrayImage {
        let mut result = img.clone();
        imageops::invert(&mut result);
        result
    }

    /// Растяжение гистограммы на весь диапазон 0-255
    pub fn stretch_contrast(&self, img: &GrayImage) -> GrayImage {
        let (min_val, max_val) = img
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));

        if min_val >= max_val {
            return img.clone();
        }

        let range = f32::from(max_val - min_val);
        let mut result = img.clone();
        for p in result.pixels_mut() {
            p.0[0] = (f32::from(p.0[0] - min_val) / range * 255.0) as u8;
        }
        result
    }

    /// Жёсткая бинаризация по порогу из конфигурации
    pub fn threshold(&self, img: &GrayImage) -> GrayImage {
        let threshold = self.config.threshold;
        let mut result = img.clone();
        for p in result.pixels_mut() {
            p.0[0] = if p.0[0] < threshold { 0 } else { 255 };
        }
        result
    }

    /// Ресайз изображения с сохранением пропорций
    pub fn resize(&self, img: &GrayImage, max_dimension: u32) -> GrayImage {
        let (width, height) = img.dimensions();

        if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
            return img.clone();
        }

        let scale = max_dimension as f32 / width.max(height) as f32;
        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);

        imageops::resize(img, new_width, new_height, imageops::FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert() {
        let processor = ImageProcessor::default();
        let img = GrayImage::from_pixel(10, 10, Luma([100]));
        let inverted = processor.invert(&img);
        assert_eq!(inverted.get_pixel(0, 0).0[0], 155);
    }

    #[test]
    fn test_pad_adds_light_border() {
        let processor = ImageProcessor::default();
        let img = GrayImage::from_pixel(10, 6, Luma([0]));
        let padded = processor.pad(&img, 3);
        assert_eq!(padded.dimensions(), (16, 12));
        assert_eq!(padded.get_pixel(0, 0).0[0], 255);
        assert_eq!(padded.get_pixel(3, 3).0[0], 0);
        assert_eq!(padded.get_pixel(13, 9).0[0], 255);
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let processor = ImageProcessor::default();
        let img = GrayImage::new(2000, 1000);
        let resized = processor.resize(&img, 1000);
        assert_eq!(resized.dimensions(), (1000, 500));

        let small = GrayImage::new(300, 200);
        assert_eq!(processor.resize(&small, 1000).dimensions(), (300, 200));
    }

    #[test]
    fn test_threshold_and_contrast() {
        let processor = ImageProcessor::default();
        let mut img = GrayImage::from_pixel(2, 1, Luma([100]));
        img.put_pixel(1, 0, Luma([150]));

        let stretched = processor.stretch_contrast(&img);
        assert_eq!(stretched.get_pixel(0, 0).0[0], 0);
        assert_eq!(stretched.get_pixel(1, 0).0[0], 255);

        let binary = processor.threshold(&img);
        assert_eq!(binary.get_pixel(0, 0).0[0], 0);
        assert_eq!(binary.get_pixel(1, 0).0[0], 255);
    }
}
