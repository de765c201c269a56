//! Таблицы стандарта: блоки коррекции ошибок, ёмкость, выравнивающие узоры

use crate::metadata::{ErrorCorrectionLevel, Mode, Version};

/// Разбиение кодовых слов на блоки для пары (версия, уровень)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlockInfo {
    /// Количество блоков
    pub num_blocks: usize,
    /// Кодовых слов коррекции в каждом блоке
    pub ecc_per_block: usize,
    /// Количество коротких блоков (длинные на одно слово данных больше)
    pub num_short_blocks: usize,
    /// Слов данных в коротком блоке
    pub short_block_data_len: usize,
}

// Индекс: [уровень][версия]
const ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // L
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // M
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Q
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // H
];

const NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // L
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // M
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Q
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // H
];

/// Количество модулей под данные и коррекцию (без функциональных узоров)
pub fn num_raw_data_modules(version: Version) -> usize {
    let ver = version.value() as usize;
    let mut result = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let num_align = ver / 7 + 2;
        result -= (25 * num_align - 10) * num_align - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

/// Всего кодовых слов в символе (данные + коррекция)
pub fn num_raw_codewords(version: Version) -> usize {
    num_raw_data_modules(version) / 8
}

pub fn ec_block_info(version: Version, ec_level: ErrorCorrectionLevel) -> EcBlockInfo {
    let idx = ec_level.ordinal();
    let ver = version.value() as usize;
    let num_blocks = NUM_ERROR_CORRECTION_BLOCKS[idx][ver] as usize;
    let ecc_per_block = ECC_CODEWORDS_PER_BLOCK[idx][ver] as usize;
    let raw = num_raw_codewords(version);
    EcBlockInfo {
        num_blocks,
        ecc_per_block,
        num_short_blocks: num_blocks - raw % num_blocks,
        short_block_data_len: raw / num_blocks - ecc_per_block,
    }
}

/// Кодовых слов данных для пары (версия, уровень)
pub fn num_data_codewords(version: Version, ec_level: ErrorCorrectionLevel) -> usize {
    let info = ec_block_info(version, ec_level);
    num_raw_codewords(version) - info.ecc_per_block * info.num_blocks
}

/// Ёмкость области данных в битах
pub fn data_capacity_bits(version: Version, ec_level: ErrorCorrectionLevel) -> usize {
    num_data_codewords(version, ec_level) * 8
}

/// Длина закодированного сегмента в битах, включая индикатор режима и счётчик.
/// `None`, если количество символов не помещается в поле счётчика.
pub fn segment_bit_length(mode: Mode, num_chars: usize, version: Version) -> Option<usize> {
    let count_bits = mode.char_count_bits(version);
    if num_chars >= 1 << count_bits {
        return None;
    }
    let payload_bits = match mode {
        Mode::Numeric => num_chars / 3 * 10 + [0, 4, 7][num_chars % 3],
        Mode::Alphanumeric => num_chars / 2 * 11 + (num_chars % 2) * 6,
        Mode::Byte => num_chars * 8,
    };
    Some(4 + count_bits + payload_bits)
}

/// Максимальная длина полезной нагрузки (в символах режима) для пары (версия, уровень)
pub fn max_payload_len(mode: Mode, version: Version, ec_level: ErrorCorrectionLevel) -> usize {
    let capacity = data_capacity_bits(version, ec_level);
    let available = capacity.saturating_sub(4 + mode.char_count_bits(version));
    let len = match mode {
        Mode::Numeric => available / 10 * 3 + [0, 0, 0, 0, 1, 1, 1, 2, 2, 2][available % 10],
        Mode::Alphanumeric => available / 11 * 2 + usize::from(available % 11 >= 6),
        Mode::Byte => available / 8,
    };
    len.min((1 << mode.char_count_bits(version)) - 1)
}

/// Координаты центров выравнивающих узоров (по обеим осям)
pub fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let ver = version.value() as usize;
    if ver == 1 {
        return Vec::new();
    }
    let num_align = ver / 7 + 2;
    let step = if ver == 32 {
        26
    } else {
        (ver * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };
    let size = version.size();
    let mut positions: Vec<usize> = (0..num_align - 1).map(|i| size - 7 - i * step).collect();
    positions.push(6);
    positions.reverse();
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn test_data_codewords_known_values() {
        assert_eq!(num_data_codewords(v(1), ErrorCorrectionLevel::L), 19);
        assert_eq!(num_data_codewords(v(1), ErrorCorrectionLevel::M), 16);
        assert_eq!(num_data_codewords(v(1), ErrorCorrectionLevel::H), 9);
        assert_eq!(num_data_codewords(v(5), ErrorCorrectionLevel::Q), 62);
        assert_eq!(num_data_codewords(v(40), ErrorCorrectionLevel::L), 2956);
        assert_eq!(num_raw_codewords(v(40)), 3706);
    }

    #[test]
    fn test_block_layout_version_5_q() {
        // 5-Q: 2 блока по 15 и 2 блока по 16 слов данных, по 18 слов коррекции
        let info = ec_block_info(v(5), ErrorCorrectionLevel::Q);
        assert_eq!(info.num_blocks, 4);
        assert_eq!(info.ecc_per_block, 18);
        assert_eq!(info.num_short_blocks, 2);
        assert_eq!(info.short_block_data_len, 15);
    }

    #[test]
    fn test_max_payload_len_matches_capacity_table() {
        assert_eq!(max_payload_len(Mode::Byte, v(1), ErrorCorrectionLevel::H), 7);
        assert_eq!(max_payload_len(Mode::Numeric, v(1), ErrorCorrectionLevel::H), 17);
        assert_eq!(max_payload_len(Mode::Alphanumeric, v(1), ErrorCorrectionLevel::M), 20);
        assert_eq!(max_payload_len(Mode::Byte, v(40), ErrorCorrectionLevel::L), 2953);
        assert_eq!(max_payload_len(Mode::Numeric, v(40), ErrorCorrectionLevel::L), 7089);
        assert_eq!(max_payload_len(Mode::Alphanumeric, v(40), ErrorCorrectionLevel::H), 1852);
    }

    #[test]
    fn test_alignment_positions() {
        assert!(alignment_pattern_positions(v(1)).is_empty());
        assert_eq!(alignment_pattern_positions(v(2)), vec![6, 18]);
        assert_eq!(alignment_pattern_positions(v(7)), vec![6, 22, 38]);
        assert_eq!(alignment_pattern_positions(v(32)), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_pattern_positions(v(40)), vec![6, 30, 58, 86, 114, 142, 170]);
    }
}
