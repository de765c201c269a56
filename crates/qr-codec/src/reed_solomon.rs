//! Коды Рида-Соломона над GF(256)
//!
//! Поле строится по примитивному многочлену x^8 + x^4 + x^3 + x^2 + 1 (0x11D),
//! порождающий многочлен степени n имеет корни α^0 .. α^(n-1).

/// Арифметика в GF(256) через таблицы логарифмов
pub struct Gf256;

const PRIMITIVE: u16 = 0x11D;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();
static EXP_TABLE: [u8; 256] = TABLES.0;
static LOG_TABLE: [u8; 256] = TABLES.1;

impl Gf256 {
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        EXP_TABLE[(log_a + log_b) % 255]
    }

    /// α^n
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }
}

/// Кодер: считает кодовые слова коррекции для одного блока
#[derive(Debug, Clone)]
pub struct ReedSolomonEncoder {
    /// Коэффициенты порождающего многочлена без старшего (всегда 1), от старшей степени
    divisor: Vec<u8>,
}

impl ReedSolomonEncoder {
    pub fn new(degree: usize) -> Self {
        assert!((1..=255).contains(&degree), "Degree out of range");
        // Начинаем с многочлена 1 и умножаем на (x - α^i)
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Gf256::mul(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Gf256::mul(root, 0x02);
        }
        Self { divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Остаток от деления data(x) * x^n на порождающий многочлен
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut remainder = vec![0u8; self.divisor.len()];
        for &b in data {
            let factor = b ^ remainder[0];
            remainder.rotate_left(1);
            let last = remainder.len() - 1;
            remainder[last] = 0;
            for (r, &d) in remainder.iter_mut().zip(&self.divisor) {
                *r ^= Gf256::mul(d, factor);
            }
        }
        remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(poly: &[u8], x: u8) -> u8 {
        poly.iter().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
    }

    #[test]
    fn test_field_tables() {
        assert_eq!(Gf256::exp(0), 1);
        assert_eq!(Gf256::exp(8), 0x1D);
        assert_eq!(Gf256::exp(255), 1);
        assert_eq!(Gf256::mul(0, 7), 0);
        assert_eq!(Gf256::mul(2, 0x80), 0x1D);
        for a in 1..=255u8 {
            assert_eq!(Gf256::mul(a, 1), a);
        }
    }

    #[test]
    fn test_generator_degree_7() {
        // g(x) для 7 слов коррекции: α^0 x^7 + α^87 x^6 + α^229 x^5 + α^146 x^4 + α^149 x^3 + α^238 x^2 + α^102 x + α^21
        let rs = ReedSolomonEncoder::new(7);
        let expected: Vec<u8> = [87, 229, 146, 149, 238, 102, 21].iter().map(|&e| Gf256::exp(e)).collect();
        assert_eq!(rs.divisor, expected);
    }

    #[test]
    fn test_codeword_is_divisible_by_generator() {
        // Полный кодовый вектор обращается в ноль во всех корнях порождающего многочлена
        let data = [0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11];
        let rs = ReedSolomonEncoder::new(10);
        let ecc = rs.encode(&data);
        assert_eq!(ecc.len(), 10);

        let codeword: Vec<u8> = data.iter().chain(ecc.iter()).copied().collect();
        for i in 0..10 {
            assert_eq!(eval(&codeword, Gf256::exp(i)), 0, "root alpha^{}", i);
        }
    }

    #[test]
    fn test_annex_i_ecc() {
        // Пример из приложения I стандарта: "01234567", 1-M
        let data = [0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11];
        let ecc = ReedSolomonEncoder::new(10).encode(&data);
        assert_eq!(ecc, vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]);
    }
}
