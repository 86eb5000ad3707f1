//! Стартовая скорость бактерии: 2D Gaussian (Box–Muller, polar method)

use bevy::math::Vec2;
use rand::Rng;

/// Пара независимых N(0, 1) значений
///
/// Polar method: reject-sample (u, v) в единичном круге, затем
/// масштаб sqrt(-2 ln s / s).
pub fn sample_standard_normal_pair<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    loop {
        let u: f32 = rng.gen_range(-1.0..1.0);
        let v: f32 = rng.gen_range(-1.0..1.0);
        let s = u * u + v * v;

        // s == 0 → ln(0); s >= 1 → вне круга
        if s > 0.0 && s < 1.0 {
            let factor = (-2.0 * s.ln() / s).sqrt();
            return (u * factor, v * factor);
        }
    }
}

/// Скорость с компонентами ~ N(0, std_dev²)
pub fn sample_gaussian_velocity<R: Rng + ?Sized>(rng: &mut R, std_dev: f32) -> Vec2 {
    let (x, y) = sample_standard_normal_pair(rng);
    Vec2::new(x, y) * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        const PAIRS: usize = 10_000;

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for _ in 0..PAIRS {
            let (a, b) = sample_standard_normal_pair(&mut rng);
            for value in [a as f64, b as f64] {
                sum += value;
                sum_sq += value * value;
            }
        }

        let n = (PAIRS * 2) as f64;
        let mean = sum / n;
        let variance = sum_sq / n - mean * mean;

        assert!(mean.abs() < 0.05, "mean = {}", mean);
        assert!((variance.sqrt() - 1.0).abs() < 0.05, "std = {}", variance.sqrt());
    }

    #[test]
    fn test_samples_are_finite() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1000 {
            let velocity = sample_gaussian_velocity(&mut rng, 3.0);
            assert!(velocity.is_finite());
        }
    }

    #[test]
    fn test_zero_std_dev_gives_zero_velocity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sample_gaussian_velocity(&mut rng, 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_same_seed_same_samples() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(42);
        let mut rng2 = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..100 {
            assert_eq!(
                sample_gaussian_velocity(&mut rng1, 1.0),
                sample_gaussian_velocity(&mut rng2, 1.0)
            );
        }
    }
}
