//! Готовый символ QR: неизменяемая квадратная сетка модулей

use std::fmt;

use crate::metadata::{ErrorCorrectionLevel, MaskPattern, Mode, Version};
use crate::penalty;

/// Символ QR-кода
///
/// Создаётся только кодером и после этого не меняется.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    version: Version,
    ec_level: ErrorCorrectionLevel,
    mask: MaskPattern,
    mode: Mode,
    size: usize,
    /// Построчно, true = тёмный модуль
    modules: Vec<bool>,
}

impl Symbol {
    pub(crate) fn new(
        version: Version,
        ec_level: ErrorCorrectionLevel,
        mask: MaskPattern,
        mode: Mode,
        modules: Vec<bool>,
    ) -> Self {
        let size = version.size();
        debug_assert_eq!(modules.len(), size * size);
        Self {
            version,
            ec_level,
            mask,
            mode,
            size,
            modules,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn ec_level(&self) -> ErrorCorrectionLevel {
        self.ec_level
    }

    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    /// Режим, которым закодирована нагрузка
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Сторона в модулях (4 * version + 17)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Цвет модуля; координаты за пределами символа считаются светлыми
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    /// Все модули построчно
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks(self.size)
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|m| **m).count()
    }

    /// Штраф по четырём правилам стандарта
    pub fn penalty_score(&self) -> u32 {
        penalty::penalty_score(&self.modules, self.size)
    }

    /// Текстовый дамп: по символу на модуль, строки через '\n'
    pub fn to_debug_string(&self, dark: char, light: char) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|&m| if m { dark } else { light }));
        }
        out
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_debug_string('#', '.'))
    }
}
