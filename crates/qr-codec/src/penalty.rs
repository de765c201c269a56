//! Штрафные правила для выбора маски

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// Суммарный штраф квадратной сетки `size` x `size` (построчно, true = тёмный)
pub fn penalty_score(modules: &[bool], size: usize) -> u32 {
    debug_assert_eq!(modules.len(), size * size);
    if size == 0 {
        return 0;
    }
    let at = |x: usize, y: usize| modules[y * size + x];
    let mut result = 0;

    // N1 и N3 по строкам и столбцам
    for y in 0..size {
        result += score_line((0..size).map(|x| at(x, y)), size);
    }
    for x in 0..size {
        result += score_line((0..size).map(|y| at(x, y)), size);
    }

    // N2: одноцветные блоки 2x2
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = at(x, y);
            if color == at(x + 1, y) && color == at(x, y + 1) && color == at(x + 1, y + 1) {
                result += PENALTY_N2;
            }
        }
    }

    // N4: отклонение доли тёмных модулей от 50% с шагом 5%
    let dark = modules.iter().filter(|m| **m).count() as i64;
    let total = (size * size) as i64;
    // Ровно 50% на чётной сетке даёт -1
    let k = (((dark * 20 - total * 10).abs() + total - 1) / total - 1).max(0);
    result += k as u32 * PENALTY_N4;

    result
}

/// Серии одного цвета (N1) и узоры 1:1:3:1:1 со светлым полем в 4 модуля (N3)
fn score_line(line: impl Iterator<Item = bool>, size: usize) -> u32 {
    let mut result = 0;
    let mut run_color = false;
    let mut run_len = 0;
    let mut history = RunHistory::new(size);
    for color in line {
        if color == run_color {
            run_len += 1;
            if run_len == 5 {
                result += PENALTY_N1;
            } else if run_len > 5 {
                result += 1;
            }
        } else {
            history.push(run_len);
            if !run_color {
                result += history.count_finder_like() * PENALTY_N3;
            }
            run_color = color;
            run_len = 1;
        }
    }
    result + history.terminate(run_color, run_len) * PENALTY_N3
}

/// Длины последних семи серий; граница символа считается светлой
struct RunHistory {
    size: usize,
    runs: [usize; 7],
}

impl RunHistory {
    fn new(size: usize) -> Self {
        Self { size, runs: [0; 7] }
    }

    fn push(&mut self, mut run_len: usize) {
        if self.runs[0] == 0 {
            // Первая серия линии примыкает к светлой зоне за краем
            run_len += self.size;
        }
        self.runs.copy_within(0..6, 1);
        self.runs[0] = run_len;
    }

    fn count_finder_like(&self) -> u32 {
        let r = &self.runs;
        let n = r[1];
        let core = n > 0 && r[2] == n && r[3] == n * 3 && r[4] == n && r[5] == n;
        u32::from(core && (r[0] >= n * 4 || r[6] >= n * 4))
    }

    fn terminate(mut self, run_color: bool, mut run_len: usize) -> u32 {
        if run_color {
            self.push(run_len);
            run_len = 0;
        }
        run_len += self.size;
        self.push(run_len);
        self.count_finder_like()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_grid() {
        // Сплошной светлый 21x21: N1 по 42 линиям, N2 по 400 блокам, N4 с отклонением 50%
        let size = 21;
        let modules = vec![false; size * size];
        let per_line = PENALTY_N1 + (size as u32 - 5);
        let expected = 42 * per_line + 400 * PENALTY_N2 + 9 * PENALTY_N4;
        assert_eq!(penalty_score(&modules, size), expected);
    }

    #[test]
    fn test_finder_like_run_detected() {
        // Линия 1:1:3:1:1 с четырьмя светлыми модулями справа
        let line = [true, false, true, true, true, false, true, false, false, false, false];
        let score = score_line(line.iter().copied(), line.len());
        assert_eq!(score, PENALTY_N3);
    }

    #[test]
    fn test_even_and_empty_grids() {
        // Ровно половина тёмных модулей: отклонение N4 нулевое
        assert_eq!(penalty_score(&[true, false, false, true], 2), 0);
        assert_eq!(penalty_score(&[], 0), 0);
    }

    #[test]
    fn test_checkerboard_has_no_block_penalty() {
        let size = 21;
        let modules: Vec<bool> = (0..size * size).map(|i| (i % size + i / size) % 2 == 0).collect();
        // Нет серий длиннее 1, нет блоков 2x2, доля тёмных ~50%
        assert_eq!(penalty_score(&modules, size), 0);
    }
}
