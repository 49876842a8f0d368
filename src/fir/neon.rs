//! NEON optimized FIR convolution implementation for aarch64.

use core::arch::aarch64::*;

/// NEON implementation of FIR convolution (dot product).
#[target_feature(enable = "neon")]
pub(super) unsafe fn convolve_neon(input: &[f32], coeffs: &[f32]) -> f32 {
    const SIMD_WIDTH: usize = 4;
    let taps = input.len().min(coeffs.len());
    let simd_taps = taps - taps % SIMD_WIDTH;

    let head = unsafe {
        let mut acc = vdupq_n_f32(0.0);

        for offset in (0..simd_taps).step_by(SIMD_WIDTH) {
            let input_vec = vld1q_f32(input.as_ptr().add(offset));
            let coeffs_vec = vld1q_f32(coeffs.as_ptr().add(offset));
            acc = vfmaq_f32(acc, coeffs_vec, input_vec);
        }

        vaddvq_f32(acc)
    };

    head + super::convolve_scalar(&input[simd_taps..taps], &coeffs[simd_taps..taps])
}
