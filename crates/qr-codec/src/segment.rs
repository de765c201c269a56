//! Выбор режима и кодирование полезной нагрузки в битовый поток

use crate::bits::BitBuffer;
use crate::metadata::{Mode, Version};
use crate::tables;

const ALPHANUMERIC_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Сегмент данных в одном режиме
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    mode: Mode,
    data: &'a [u8],
}

impl<'a> Segment<'a> {
    /// Самый компактный режим, которым кодируется вся нагрузка.
    /// Пустая нагрузка кодируется байтовым сегментом нулевой длины.
    pub fn from_payload(data: &'a [u8]) -> Self {
        let mode = if data.is_empty() {
            Mode::Byte
        } else if data.iter().all(u8::is_ascii_digit) {
            Mode::Numeric
        } else if data.iter().all(|b| alphanumeric_value(*b).is_some()) {
            Mode::Alphanumeric
        } else {
            Mode::Byte
        };
        Self { mode, data }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Количество символов для счётчика (в байтовом режиме - байты)
    pub fn num_chars(&self) -> usize {
        self.data.len()
    }

    /// Полная длина в битах для версии, `None` если не влезает в счётчик
    pub fn bit_length(&self, version: Version) -> Option<usize> {
        tables::segment_bit_length(self.mode, self.num_chars(), version)
    }

    /// Индикатор режима, счётчик и данные
    pub fn write_to(&self, bb: &mut BitBuffer, version: Version) {
        bb.append_bits(self.mode.indicator(), 4);
        bb.append_bits(self.num_chars() as u32, self.mode.char_count_bits(version));
        match self.mode {
            Mode::Numeric => {
                for chunk in self.data.chunks(3) {
                    let value = chunk.iter().fold(0u32, |acc, &d| acc * 10 + u32::from(d - b'0'));
                    bb.append_bits(value, chunk.len() * 3 + 1);
                }
            }
            Mode::Alphanumeric => {
                for pair in self.data.chunks(2) {
                    let values: Vec<u32> = pair
                        .iter()
                        .filter_map(|&c| alphanumeric_value(c))
                        .collect();
                    match values.as_slice() {
                        [a, b] => bb.append_bits(a * 45 + b, 11),
                        [a] => bb.append_bits(*a, 6),
                        _ => unreachable!("alphanumeric segment holds only charset bytes"),
                    }
                }
            }
            Mode::Byte => {
                for &b in self.data {
                    bb.append_bits(u32::from(b), 8);
                }
            }
        }
    }
}

fn alphanumeric_value(c: u8) -> Option<u32> {
    ALPHANUMERIC_CHARSET
        .iter()
        .position(|&x| x == c)
        .map(|i| i as u32)
}
