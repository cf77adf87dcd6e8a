use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// LCG shared by the fan-out phase and runtime location picks.
#[derive(Debug, Clone, Copy)]
pub struct WorldRng {
    state: u64,
}

impl WorldRng {
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos() as u64)
            .unwrap_or(DEFAULT_SEED);
        Self::from_seed(seed)
    }

    pub fn from_seed(seed: u64) -> Self {
        let seed = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Inclusive on both ends.
    pub fn roll_range(&mut self, min: i32, max: i32) -> i32 {
        let (min, max) = if min >= max { (min, min) } else { (min, max) };
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        let value = u64::from(self.next_u32()) % span;
        (i64::from(min) + value as i64) as i32
    }

    pub fn roll_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.next_u32() as usize % len
    }
}

impl Default for WorldRng {
    fn default() -> Self {
        Self::from_seed(DEFAULT_SEED)
    }
}
