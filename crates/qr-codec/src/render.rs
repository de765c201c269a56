//! Растеризация символа: изображение с тихой зоной, PNG, превью в терминале

use std::path::Path;

use image::{imageops, GrayImage, ImageFormat, Luma};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbol::Symbol;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Ошибки растеризации и сохранения
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to prepare output path: {0}")]
    Io(#[from] std::io::Error),
}

/// Конфигурация растеризации
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Пикселей на модуль
    pub module_size: u32,
    /// Ширина тихой зоны в модулях
    pub quiet_zone: u32,
    /// Сторона области предпросмотра в пикселях
    pub display_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            module_size: 10,
            quiet_zone: 4,
            display_size: 300,
        }
    }
}

/// Растеризатор символов
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Сторона итогового изображения в пикселях
    pub fn image_side(&self, symbol: &Symbol) -> u32 {
        (symbol.size() as u32 + 2 * self.config.quiet_zone) * self.config.module_size.max(1)
    }

    /// Чёрно-белое изображение: тёмный = 0, светлый = 255
    pub fn render(&self, symbol: &Symbol) -> GrayImage {
        let scale = self.config.module_size.max(1);
        let border = self.config.quiet_zone;
        let side = self.image_side(symbol);
        let mut img = GrayImage::from_pixel(side, side, LIGHT);

        for (y, row) in symbol.rows().enumerate() {
            for (x, &dark) in row.iter().enumerate() {
                if !dark {
                    continue;
                }
                let px = (border + x as u32) * scale;
                let py = (border + y as u32) * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        img.put_pixel(px + dx, py + dy, DARK);
                    }
                }
            }
        }
        img
    }

    /// Изображение, вписанное в `display_size` с сохранением пропорций
    pub fn render_for_display(&self, symbol: &Symbol) -> GrayImage {
        let img = self.render(symbol);
        let target = self.config.display_size.max(1);
        let side = img.width();
        if side == target {
            return img;
        }
        // Квадрат, так что обе стороны масштабируются одинаково
        imageops::resize(&img, target, target, imageops::FilterType::Nearest)
    }

    /// Сохранение в PNG, каталоги создаются при необходимости
    pub fn save_png(&self, symbol: &Symbol, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let img = self.render(symbol);
        img.save_with_format(path, ImageFormat::Png)?;
        log::info!("Saved {}x{} QR image to {}", img.width(), img.height(), path.display());
        Ok(())
    }

    /// PNG в памяти
    pub fn to_png_bytes(&self, symbol: &Symbol) -> Result<Vec<u8>, RenderError> {
        let img = self.render(symbol);
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

/// Превью для терминала: два символа на модуль, светлая тихая зона
pub fn to_terminal_string(symbol: &Symbol, quiet_zone: usize) -> String {
    let size = symbol.size();
    let border = quiet_zone as isize;
    let mut out = String::new();
    for y in -border..size as isize + border {
        for x in -border..size as isize + border {
            let dark = x >= 0 && y >= 0 && symbol.is_dark(x as usize, y as usize);
            out.push_str(if dark { "██" } else { "  " });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::metadata::{ErrorCorrectionLevel, Version};

    fn sample() -> Symbol {
        encode(b"HELLO", Version::MIN, ErrorCorrectionLevel::M).unwrap()
    }

    #[test]
    fn test_render_dimensions_and_quiet_zone() {
        let renderer = Renderer::default();
        let img = renderer.render(&sample());
        // (21 + 2 * 4) * 10
        assert_eq!(img.dimensions(), (290, 290));
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        assert_eq!(img.get_pixel(39, 39).0[0], 255);
        // Левый верхний угол поискового узора
        assert_eq!(img.get_pixel(40, 40).0[0], 0);
        assert_eq!(img.get_pixel(49, 49).0[0], 0);
    }

    #[test]
    fn test_render_one_pixel_per_module() {
        let symbol = sample();
        let renderer = Renderer::new(RenderConfig {
            module_size: 1,
            quiet_zone: 0,
            display_size: 300,
        });
        let img = renderer.render(&symbol);
        for y in 0..symbol.size() {
            for x in 0..symbol.size() {
                let expected = if symbol.is_dark(x, y) { 0 } else { 255 };
                assert_eq!(img.get_pixel(x as u32, y as u32).0[0], expected);
            }
        }
    }

    #[test]
    fn test_display_scaling() {
        let img = Renderer::default().render_for_display(&sample());
        assert_eq!(img.dimensions(), (300, 300));
    }

    #[test]
    fn test_png_bytes_roundtrip_through_image() {
        let renderer = Renderer::default();
        let bytes = renderer.to_png_bytes(&sample()).unwrap();
        let loaded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(loaded, renderer.render(&sample()));
    }

    #[test]
    fn test_terminal_preview_shape() {
        let text = to_terminal_string(&sample(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 25);
        assert!(lines.iter().all(|l| l.chars().count() == 50));
    }
}
