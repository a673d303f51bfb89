/// Линейный конгруэнтный генератор, от которого зависят все случайные решения генерации.
///
/// Каждая фаза создаёт свой экземпляр из сида, поэтому реки и города
/// воспроизводимы независимо от того, сколько чисел взяла предыдущая фаза.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub const MULTIPLIER: u32 = 1_664_525;
    pub const INCREMENT: u32 = 1_013_904_223;

    const SCALE: f64 = 4_294_967_296.0; // 2^32

    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Сдвигает состояние и возвращает его
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Равномерное число в `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / Self::SCALE
    }

    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Равномерное целое в `[0, n)`; `n` не должно быть нулём
    pub fn below(&mut self, n: u32) -> u32 {
        (self.next_f64() * f64::from(n)).floor() as u32
    }
}
