use rand::Rng;

/// Uniform sample in `[-amplitude / 2, amplitude / 2)`.
///
/// Every bit of surface roughness and spin variation goes through here so a
/// seeded rng reproduces a run exactly.
#[inline]
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * amplitude
}

/// Uniform sample in `[lo, hi]`, tolerating `lo == hi` and swapped bounds.
pub fn in_range<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if lo == hi {
        return lo;
    }
    rng.random_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn jitter_stays_within_half_amplitude() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let j = jitter(&mut rng, 0.05);
            assert!((-0.025..0.025).contains(&j), "jitter out of range: {j}");
        }
    }

    #[test]
    fn degenerate_range_returns_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(in_range(&mut rng, (4.0, 4.0)), 4.0);
        let v = in_range(&mut rng, (10.0, 2.0));
        assert!((2.0..=10.0).contains(&v));
    }
}
