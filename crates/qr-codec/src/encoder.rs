//! Модуль кодирования QR-кодов
//!
//! Полный конвейер ISO/IEC 18004 (Model 2):
//! - Выбор режима и сборка битового потока с заполнителями
//! - Коды Рида-Соломона по блокам и чередование блоков
//! - Размещение битов зигзагом в обход функциональных узоров
//! - Перебор восьми масок и выбор по минимальному штрафу

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bits::BitBuffer;
use crate::canvas::Canvas;
use crate::metadata::{ErrorCorrectionLevel, MaskPattern, Version};
use crate::penalty;
use crate::reed_solomon::ReedSolomonEncoder;
use crate::segment::Segment;
use crate::symbol::Symbol;
use crate::tables;

/// Ошибки кодирования
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error(
        "Data too long for version {version}-{ec_level}: needs {}, capacity is {capacity_bits} bits",
        describe_needed_bits(.needed_bits)
    )]
    CapacityExceeded {
        version: Version,
        ec_level: ErrorCorrectionLevel,
        /// `None`, если длина не помещается даже в поле счётчика символов
        needed_bits: Option<usize>,
        capacity_bits: usize,
    },
}

fn describe_needed_bits(needed_bits: &Option<usize>) -> String {
    match needed_bits {
        Some(n) => format!("{} bits", n),
        None => "more characters than the count field holds".to_string(),
    }
}

/// Конфигурация кодера
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Считать версию минимальной и подбирать наименьшую подходящую
    pub fit_version: bool,
    /// Фиксированная маска вместо выбора по штрафу
    pub mask: Option<MaskPattern>,
}

/// Кодер QR-кодов
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Создание кодера с конфигурацией
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Кодирование нагрузки с учётом конфигурации
    pub fn encode(
        &self,
        payload: &[u8],
        version: Version,
        ec_level: ErrorCorrectionLevel,
    ) -> Result<Symbol, EncodeError> {
        let version = if self.config.fit_version {
            fit_version(payload, version, ec_level)?
        } else {
            version
        };
        encode_inner(payload, version, ec_level, self.config.mask)
    }
}

/// Кодирование в заданную версию с выбором маски по штрафу
pub fn encode(
    payload: &[u8],
    version: Version,
    ec_level: ErrorCorrectionLevel,
) -> Result<Symbol, EncodeError> {
    encode_inner(payload, version, ec_level, None)
}

/// Кодирование с фиксированной маской
pub fn encode_with_mask(
    payload: &[u8],
    version: Version,
    ec_level: ErrorCorrectionLevel,
    mask: MaskPattern,
) -> Result<Symbol, EncodeError> {
    encode_inner(payload, version, ec_level, Some(mask))
}

/// Наименьшая версия не меньше `min_version`, вмещающая нагрузку
pub fn fit_version(
    payload: &[u8],
    min_version: Version,
    ec_level: ErrorCorrectionLevel,
) -> Result<Version, EncodeError> {
    let segment = Segment::from_payload(payload);
    let mut version = min_version;
    loop {
        let needed_bits = segment.bit_length(version);
        let capacity_bits = tables::data_capacity_bits(version, ec_level);
        if needed_bits.is_some_and(|n| n <= capacity_bits) {
            if version != min_version {
                log::info!("Version {} too small, fitted to version {}", min_version, version);
            }
            return Ok(version);
        }
        match version.next() {
            Some(next) => version = next,
            None => {
                return Err(EncodeError::CapacityExceeded {
                    version,
                    ec_level,
                    needed_bits,
                    capacity_bits,
                })
            }
        }
    }
}

fn encode_inner(
    payload: &[u8],
    version: Version,
    ec_level: ErrorCorrectionLevel,
    forced_mask: Option<MaskPattern>,
) -> Result<Symbol, EncodeError> {
    let segment = Segment::from_payload(payload);
    log::debug!(
        "Encoding {} bytes as {} into version {}-{}",
        payload.len(),
        segment.mode(),
        version,
        ec_level
    );

    let data = data_codewords(&segment, version, ec_level)?;
    let codewords = add_ecc_and_interleave(&data, version, ec_level);

    let mut canvas = Canvas::new(version);
    canvas.draw_codewords(&codewords);

    let mask = match forced_mask {
        Some(mask) => mask,
        None => select_mask(&mut canvas, ec_level),
    };
    canvas.apply_mask(mask);
    canvas.draw_format_bits(ec_level, mask);
    log::debug!("Applied mask {}", mask);

    Ok(Symbol::new(version, ec_level, mask, segment.mode(), canvas.into_modules()))
}

/// Битовый поток: сегмент, терминатор, выравнивание до байта, байты-заполнители 0xEC/0x11
pub(crate) fn data_codewords(
    segment: &Segment<'_>,
    version: Version,
    ec_level: ErrorCorrectionLevel,
) -> Result<Vec<u8>, EncodeError> {
    let capacity_bits = tables::data_capacity_bits(version, ec_level);
    let needed_bits = segment.bit_length(version);
    match needed_bits {
        Some(n) if n <= capacity_bits => {}
        _ => {
            return Err(EncodeError::CapacityExceeded {
                version,
                ec_level,
                needed_bits,
                capacity_bits,
            })
        }
    }

    let mut bb = BitBuffer::with_capacity(capacity_bits);
    segment.write_to(&mut bb, version);
    debug_assert_eq!(Some(bb.len()), needed_bits);

    let terminator = (capacity_bits - bb.len()).min(4);
    bb.append_bits(0, terminator);
    let align = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, align);

    for &pad in [0xEC, 0x11].iter().cycle() {
        if bb.len() >= capacity_bits {
            break;
        }
        bb.append_bits(pad, 8);
    }
    Ok(bb.into_bytes())
}

/// Делит данные на блоки, считает коррекцию и чередует: сначала данные, потом коррекция
pub(crate) fn add_ecc_and_interleave(
    data: &[u8],
    version: Version,
    ec_level: ErrorCorrectionLevel,
) -> Vec<u8> {
    let info = tables::ec_block_info(version, ec_level);
    assert_eq!(data.len(), tables::num_data_codewords(version, ec_level));

    let rs = ReedSolomonEncoder::new(info.ecc_per_block);
    let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(info.num_blocks);
    let mut rest = data;
    for i in 0..info.num_blocks {
        let len = info.short_block_data_len + usize::from(i >= info.num_short_blocks);
        let (block, tail) = rest.split_at(len);
        blocks.push((block, rs.encode(block)));
        rest = tail;
    }
    debug_assert!(rest.is_empty());

    let mut result = Vec::with_capacity(tables::num_raw_codewords(version));
    for i in 0..=info.short_block_data_len {
        // Последнее слово есть только в длинных блоках
        for (block, _) in &blocks {
            if let Some(&b) = block.get(i) {
                result.push(b);
            }
        }
    }
    for i in 0..info.ecc_per_block {
        for (_, ecc) in &blocks {
            result.push(ecc[i]);
        }
    }
    debug_assert_eq!(result.len(), tables::num_raw_codewords(version));
    result
}

/// Перебор масок; при равенстве штрафов выигрывает меньший номер
fn select_mask(canvas: &mut Canvas, ec_level: ErrorCorrectionLevel) -> MaskPattern {
    let mut best: Option<(u32, MaskPattern)> = None;
    for mask in MaskPattern::all() {
        canvas.apply_mask(mask);
        canvas.draw_format_bits(ec_level, mask);
        let score = penalty::penalty_score(canvas.modules(), canvas.size());
        log::trace!("Mask {} penalty {}", mask, score);
        if best.map_or(true, |(min, _)| score < min) {
            best = Some((score, mask));
        }
        canvas.apply_mask(mask);
    }
    best.map(|(_, mask)| mask).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Mode;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn test_data_codewords_annex_i() {
        let segment = Segment::from_payload(b"01234567");
        let data = data_codewords(&segment, v(1), ErrorCorrectionLevel::M).unwrap();
        assert_eq!(
            data,
            vec![0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11]
        );
    }

    #[test]
    fn test_interleave_single_block_appends_ecc() {
        let segment = Segment::from_payload(b"01234567");
        let data = data_codewords(&segment, v(1), ErrorCorrectionLevel::M).unwrap();
        let all = add_ecc_and_interleave(&data, v(1), ErrorCorrectionLevel::M);
        assert_eq!(all.len(), 26);
        assert_eq!(&all[..16], data.as_slice());
        assert_eq!(&all[16..], &[0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]);
    }

    #[test]
    fn test_interleave_mixed_block_lengths() {
        // 5-Q: блоки 15, 15, 16, 16 слов данных
        let data: Vec<u8> = (0..62).collect();
        let all = add_ecc_and_interleave(&data, v(5), ErrorCorrectionLevel::Q);
        assert_eq!(all.len(), 134);
        assert_eq!(&all[..4], &[0, 15, 30, 46]);
        // Хвост длинных блоков идёт после 15 полных столбцов
        assert_eq!(&all[60..62], &[45, 61]);
    }

    #[test]
    fn test_capacity_exceeded_reports_sizes() {
        let err = encode(b"abcdefgh", v(1), ErrorCorrectionLevel::H).unwrap_err();
        assert_eq!(
            err,
            EncodeError::CapacityExceeded {
                version: v(1),
                ec_level: ErrorCorrectionLevel::H,
                needed_bits: Some(76),
                capacity_bits: 72,
            }
        );
    }

    #[test]
    fn test_capacity_error_message() {
        let err = encode(b"abcdefgh", v(1), ErrorCorrectionLevel::H).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Data too long for version 1-H: needs 76 bits, capacity is 72 bits"
        );

        // 1024 цифры не помещаются в 10-битный счётчик версии 1
        let digits = vec![b'1'; 1024];
        let err = encode(&digits, v(1), ErrorCorrectionLevel::L).unwrap_err();
        assert!(matches!(err, EncodeError::CapacityExceeded { needed_bits: None, .. }));
        assert_eq!(
            err.to_string(),
            "Data too long for version 1-L: needs more characters than the count field holds, capacity is 152 bits"
        );
    }

    #[test]
    fn test_fit_version_picks_smallest() {
        let payload = vec![b'x'; 20];
        assert_eq!(fit_version(&payload, v(1), ErrorCorrectionLevel::L).unwrap(), v(2));
        assert_eq!(fit_version(&payload, v(3), ErrorCorrectionLevel::L).unwrap(), v(3));

        let huge = vec![b'x'; 3000];
        assert!(matches!(
            fit_version(&huge, v(1), ErrorCorrectionLevel::L),
            Err(EncodeError::CapacityExceeded { version, .. }) if version == Version::MAX
        ));
    }

    #[test]
    fn test_encoder_config_fit_and_mask() {
        let encoder = Encoder::new(EncoderConfig {
            fit_version: true,
            mask: MaskPattern::new(6),
        });
        let symbol = encoder.encode(&[b'x'; 20], v(1), ErrorCorrectionLevel::L).unwrap();
        assert_eq!(symbol.version(), v(2));
        assert_eq!(symbol.mask().value(), 6);
        assert_eq!(symbol.mode(), Mode::Byte);

        let strict = Encoder::default();
        assert!(strict.encode(&[b'x'; 20], v(1), ErrorCorrectionLevel::L).is_err());
    }
}
