//! SSE optimized FIR convolution implementation.

use core::arch::x86_64::*;

/// SSE implementation of FIR convolution (dot product).
///
/// Uses 128-bit SIMD registers to process 4 f32 values at a time. Taps past the last full
/// register are summed by the scalar kernel.
#[target_feature(enable = "sse")]
pub(super) unsafe fn convolve_sse(input: &[f32], coeffs: &[f32]) -> f32 {
    const SIMD_WIDTH: usize = 4;
    let taps = input.len().min(coeffs.len());
    let simd_taps = taps - taps % SIMD_WIDTH;

    let head = unsafe {
        let mut acc = _mm_setzero_ps();

        for offset in (0..simd_taps).step_by(SIMD_WIDTH) {
            // Load 4 input samples and 4 coefficients (unaligned load).
            let input_vec = _mm_loadu_ps(input.as_ptr().add(offset));
            let coeffs_vec = _mm_loadu_ps(coeffs.as_ptr().add(offset));

            let prod = _mm_mul_ps(coeffs_vec, input_vec);
            acc = _mm_add_ps(acc, prod);
        }

        // Horizontal sum without hadd: [a2, a3, a0, a1] then [a1+a3, ...].
        let shuf = _mm_shuffle_ps(acc, acc, 0b01_00_11_10);
        let sum1 = _mm_add_ps(acc, shuf);
        let shuf2 = _mm_shuffle_ps(sum1, sum1, 0b00_00_00_01);
        let sum2 = _mm_add_ps(sum1, shuf2);
        _mm_cvtss_f32(sum2)
    };

    head + super::convolve_scalar(&input[simd_taps..taps], &coeffs[simd_taps..taps])
}
