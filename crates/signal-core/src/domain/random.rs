//! 주입 가능한 난수 소스.
//!
//! 운영 환경에서는 엔트로피로 시드한 `StdRng`을, 테스트에서는 고정 시드를 사용합니다.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// 균등분포 난수를 공급하는 소스.
pub trait RandomSource {
    /// [0, 1) 균등분포 난수.
    fn next_uniform(&mut self) -> f64;

    /// Box–Muller 변환으로 만든 표준정규 난수.
    ///
    /// `u1`은 `ln(0)`을 피하기 위해 (0, 1]로 사상합니다.
    fn standard_normal(&mut self) -> f64 {
        let u1 = 1.0 - self.next_uniform();
        let u2 = self.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }
}

/// `rand::StdRng` 기반 난수 소스.
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// OS 엔트로피로 시드합니다. 호출마다 다른 난수열을 만듭니다.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// 고정 시드로 생성합니다.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 시드가 있으면 고정 시드로, 없으면 엔트로피로 생성합니다.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 미리 정한 값을 순환하는 소스.
    struct Cycle {
        values: Vec<f64>,
        idx: usize,
    }

    impl RandomSource for Cycle {
        fn next_uniform(&mut self) -> f64 {
            let v = self.values[self.idx % self.values.len()];
            self.idx += 1;
            v
        }
    }

    #[test]
    fn test_box_muller_known_values() {
        // u1 = 1 - 0.0 = 1 → ln(1) = 0 → z = 0
        let mut src = Cycle { values: vec![0.0, 0.3], idx: 0 };
        assert_eq!(src.standard_normal(), 0.0);

        // u1 = 1 - (1 - e^-0.5) = e^-0.5 → sqrt(1) * cos(0) = 1
        let mut src = Cycle {
            values: vec![1.0 - (-0.5f64).exp(), 0.0],
            idx: 0,
        };
        assert!((src.standard_normal() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = StdRandom::seeded(42);
        let mut b = StdRandom::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.standard_normal(), b.standard_normal());
        }
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = StdRandom::seeded(7);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.standard_normal()).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
        assert!(draws.iter().all(|z| z.is_finite()));
    }
}
