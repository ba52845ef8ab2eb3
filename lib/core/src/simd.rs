// Vectorized kernels for cosine distance.
// Runtime dispatch: AVX2/FMA on x86_64, NEON on aarch64, scalar everywhere else.
// All kernels expect slices of equal length; callers check dimensions first.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

// Below this length the scalar loop beats feature detection plus register setup
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
const MIN_DIM_SIZE_SIMD: usize = 16;

/// Dot product of two equally sized slices
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    #[cfg(target_arch = "x86_64")]
    {
        if n >= MIN_DIM_SIZE_SIMD
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if n >= MIN_DIM_SIZE_SIMD && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

/// Fused single pass over both slices.
///
/// Returns `(a·b, |a|², |b|²)`, everything a cosine computation needs without
/// walking the data three times.
#[inline]
pub fn cosine_parts_simd(a: &[f32], b: &[f32]) -> (f32, f32, f32) {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    #[cfg(target_arch = "x86_64")]
    {
        if n >= MIN_DIM_SIZE_SIMD
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { cosine_parts_avx2(a, b) };
        }
    }

    cosine_parts_scalar(a, b)
}

/// Euclidean length
#[inline]
pub fn norm_simd(v: &[f32]) -> f32 {
    dot_product_simd(v, v).sqrt()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len();
    let mut acc = _mm256_setzero_ps();
    let mut i = 0;

    while i + 8 <= n {
        let va = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb = _mm256_loadu_ps(b.as_ptr().add(i));
        acc = _mm256_fmadd_ps(va, vb, acc);
        i += 8;
    }

    let mut dot = horizontal_sum_avx(acc);
    for (x, y) in a[i..].iter().zip(&b[i..]) {
        dot += x * y;
    }
    dot
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn cosine_parts_avx2(a: &[f32], b: &[f32]) -> (f32, f32, f32) {
    let n = a.len();
    let mut ab = _mm256_setzero_ps();
    let mut aa = _mm256_setzero_ps();
    let mut bb = _mm256_setzero_ps();
    let mut i = 0;

    while i + 8 <= n {
        let va = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb = _mm256_loadu_ps(b.as_ptr().add(i));
        ab = _mm256_fmadd_ps(va, vb, ab);
        aa = _mm256_fmadd_ps(va, va, aa);
        bb = _mm256_fmadd_ps(vb, vb, bb);
        i += 8;
    }

    let mut dot = horizontal_sum_avx(ab);
    let mut norm_a = horizontal_sum_avx(aa);
    let mut norm_b = horizontal_sum_avx(bb);
    for (x, y) in a[i..].iter().zip(&b[i..]) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    (dot, norm_a, norm_b)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn horizontal_sum_avx(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let quad = _mm_add_ps(high, low);
    let pair = _mm_add_ps(quad, _mm_movehl_ps(quad, quad));
    let single = _mm_add_ss(pair, _mm_shuffle_ps(pair, pair, 0b01));
    _mm_cvtss_f32(single)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len();
    let mut acc = vdupq_n_f32(0.0);
    let mut i = 0;

    while i + 4 <= n {
        let va = vld1q_f32(a.as_ptr().add(i));
        let vb = vld1q_f32(b.as_ptr().add(i));
        acc = vfmaq_f32(acc, va, vb);
        i += 4;
    }

    let mut dot = vaddvq_f32(acc);
    for (x, y) in a[i..].iter().zip(&b[i..]) {
        dot += x * y;
    }
    dot
}

// Four independent accumulators keep the scalar loop pipelined
#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let chunks_a = a.chunks_exact(4);
    let chunks_b = b.chunks_exact(4);
    let (rest_a, rest_b) = (chunks_a.remainder(), chunks_b.remainder());

    let mut acc = [0.0f32; 4];
    for (x, y) in chunks_a.zip(chunks_b) {
        acc[0] += x[0] * y[0];
        acc[1] += x[1] * y[1];
        acc[2] += x[2] * y[2];
        acc[3] += x[3] * y[3];
    }

    let mut dot = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for (x, y) in rest_a.iter().zip(rest_b) {
        dot += x * y;
    }
    dot
}

#[inline]
fn cosine_parts_scalar(a: &[f32], b: &[f32]) -> (f32, f32, f32) {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    (dot, norm_a, norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_pair(rng: &mut StdRng, dim: usize) -> (Vec<f32>, Vec<f32>) {
        let a = (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect();
        let b = (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect();
        (a, b)
    }

    #[test]
    fn test_dispatch_agrees_with_scalar() {
        let mut rng = StdRng::seed_from_u64(7);
        for dim in [1, 3, 8, 15, 16, 17, 31, 64, 100, 384, 768] {
            let (a, b) = random_pair(&mut rng, dim);
            let fast = dot_product_simd(&a, &b);
            let slow = dot_product_scalar(&a, &b);
            assert!((fast - slow).abs() < 1e-3, "dim {}: {} vs {}", dim, fast, slow);

            let (d1, na1, nb1) = cosine_parts_simd(&a, &b);
            let (d2, na2, nb2) = cosine_parts_scalar(&a, &b);
            assert!((d1 - d2).abs() < 1e-3);
            assert!((na1 - na2).abs() < 1e-3);
            assert!((nb1 - nb2).abs() < 1e-3);
        }
    }

    #[test]
    fn test_norm() {
        assert!((norm_simd(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
        assert_eq!(norm_simd(&[]), 0.0);
    }

    #[test]
    fn test_cosine_parts_small() {
        let (dot, na, nb) = cosine_parts_simd(&[1.0, 2.0], &[3.0, 4.0]);
        assert_eq!(dot, 11.0);
        assert_eq!(na, 5.0);
        assert_eq!(nb, 25.0);
    }
}
