//! Рабочее поле символа: функциональные узоры, размещение кодовых слов, маскирование

use crate::metadata::{ErrorCorrectionLevel, MaskPattern, Version};
use crate::tables;

/// 15 бит информации о формате: BCH(15,5) с маской 0x5412
pub fn format_bits(ec_level: ErrorCorrectionLevel, mask: MaskPattern) -> u32 {
    let data = (ec_level.format_bits() << 3) | u32::from(mask.value());
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// 18 бит информации о версии: BCH(18,6), только для версий 7+
pub fn version_bits(version: Version) -> u32 {
    let ver = u32::from(version.value());
    let mut rem = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    (ver << 12) | rem
}

fn bit(value: u32, index: usize) -> bool {
    (value >> index) & 1 != 0
}

/// Изменяемая сетка модулей с отметкой функциональных областей
#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    version: Version,
    size: usize,
    /// true = тёмный модуль
    modules: Vec<bool>,
    /// true = функциональный модуль (не данные)
    function: Vec<bool>,
}

impl Canvas {
    /// Поле с нарисованными функциональными узорами и зарезервированным форматом
    pub fn new(version: Version) -> Self {
        let size = version.size();
        let mut canvas = Self {
            version,
            size,
            modules: vec![false; size * size],
            function: vec![false; size * size],
        };
        canvas.draw_function_patterns();
        canvas
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.size + x]
    }

    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.function[y * self.size + x]
    }

    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn into_modules(self) -> Vec<bool> {
        self.modules
    }

    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        let idx = y * self.size + x;
        self.modules[idx] = dark;
        self.function[idx] = true;
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size;

        // Синхронизирующие линии
        for i in 0..size {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }

        // Поисковые узоры с разделителями
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        // Выравнивающие узоры, кроме углов с поисковыми
        let positions = tables::alignment_pattern_positions(self.version);
        let last = positions.len().saturating_sub(1);
        for (i, &cx) in positions.iter().enumerate() {
            for (j, &cy) in positions.iter().enumerate() {
                let is_finder_corner = (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
                if !is_finder_corner {
                    self.draw_alignment_pattern(cx, cy);
                }
            }
        }

        // Резерв под формат, настоящие биты пишутся после выбора маски
        self.draw_format_bits(ErrorCorrectionLevel::M, MaskPattern::default());
        self.draw_version();
    }

    fn draw_finder_pattern(&mut self, cx: usize, cy: usize) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let x = cx as i32 + dx;
                let y = cy as i32 + dy;
                if (0..self.size as i32).contains(&x) && (0..self.size as i32).contains(&y) {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function(x as usize, y as usize, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, cx: usize, cy: usize) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let x = (cx as i32 + dx) as usize;
                let y = (cy as i32 + dy) as usize;
                self.set_function(x, y, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    /// Пишет обе копии формата и тёмный модуль
    pub fn draw_format_bits(&mut self, ec_level: ErrorCorrectionLevel, mask: MaskPattern) {
        let bits = format_bits(ec_level, mask);
        let size = self.size;

        // Копия у левого верхнего поискового узора
        for i in 0..6 {
            self.set_function(8, i, bit(bits, i));
        }
        self.set_function(8, 7, bit(bits, 6));
        self.set_function(8, 8, bit(bits, 7));
        self.set_function(7, 8, bit(bits, 8));
        for i in 9..15 {
            self.set_function(14 - i, 8, bit(bits, i));
        }

        // Вторая копия, разнесённая по двум другим углам
        for i in 0..8 {
            self.set_function(size - 1 - i, 8, bit(bits, i));
        }
        for i in 8..15 {
            self.set_function(8, size - 15 + i, bit(bits, i));
        }
        self.set_function(8, size - 8, true);
    }

    fn draw_version(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        for i in 0..18 {
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function(a, b, bit(bits, i));
            self.set_function(b, a, bit(bits, i));
        }
    }

    /// Размещение кодовых слов зигзагом: пары столбцов справа налево,
    /// попеременно вверх и вниз, столбец 6 пропускается
    pub fn draw_codewords(&mut self, codewords: &[u8]) {
        assert_eq!(
            codewords.len(),
            tables::num_raw_codewords(self.version),
            "Codeword count does not match version"
        );
        let size = self.size;
        let total_bits = codewords.len() * 8;
        let mut i = 0usize;
        let mut right = size as i32 - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward = (right + 1) & 2 == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for j in 0..2 {
                    let x = (right - j) as usize;
                    if !self.is_function(x, y) && i < total_bits {
                        self.modules[y * size + x] = (codewords[i >> 3] >> (7 - (i & 7))) & 1 != 0;
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
        // Биты-остатки (0-7 модулей) остаются светлыми
        debug_assert_eq!(i, total_bits);
    }

    /// XOR маски по модулям данных; повторный вызов снимает маску
    pub fn apply_mask(&mut self, mask: MaskPattern) {
        for y in 0..self.size {
            for x in 0..self.size {
                if !self.is_function(x, y) && mask.is_masked(x, y) {
                    let idx = y * self.size + x;
                    self.modules[idx] = !self.modules[idx];
                }
            }
        }
    }
}
