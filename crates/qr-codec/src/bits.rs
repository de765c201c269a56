/// Буфер битов, старший бит первым
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Длина в битах
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Дописывает младшие `count` бит значения
    pub fn append_bits(&mut self, value: u32, count: usize) {
        assert!(count <= 32 && (count == 32 || value >> count == 0), "Value out of range");
        for i in (0..count).rev() {
            self.push((value >> i) & 1 != 0);
        }
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len);
        (self.bytes[index / 8] >> (7 - index % 8)) & 1 != 0
    }

    /// Байты (последний дополнен нулями)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_bits() {
        let mut bb = BitBuffer::new();
        bb.append_bits(0b0001, 4);
        bb.append_bits(8, 10);
        assert_eq!(bb.len(), 14);
        assert_eq!(bb.as_bytes(), &[0x10, 0x20]);
        assert!(bb.get(3));
        assert!(!bb.get(4));
    }

    #[test]
    #[should_panic(expected = "Value out of range")]
    fn test_append_too_wide() {
        BitBuffer::new().append_bits(0b100, 2);
    }
}
