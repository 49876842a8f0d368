#[cfg(all(target_arch = "x86_64", target_feature = "sse"))]
mod sse;

#[cfg(target_arch = "aarch64")]
mod neon;

/// Scalar implementation of FIR convolution (dot product).
///
/// Also used by the SIMD kernels for the taps that do not fill a whole register.
#[inline(always)]
pub(crate) fn convolve_scalar(input: &[f32], coeffs: &[f32]) -> f32 {
    input
        .iter()
        .zip(coeffs)
        .fold(0.0f32, |sum, (sample, coeff)| sum + coeff * sample)
}

/// Convolves a tap row against an input window of the same length.
///
/// Selects the best available implementation based on compile-time target features:
///
/// - **SSE**: 4 f32 per iteration (x86_64, always available)
/// - **NEON**: 4 f32 per iteration with fused multiply-add (aarch64, always available)
/// - **Scalar**: Fallback for all other architectures
///
/// The selection is fixed per build, so identical input always produces identical output.
#[inline(always)]
pub(crate) fn convolve(input: &[f32], coeffs: &[f32]) -> f32 {
    debug_assert_eq!(input.len(), coeffs.len());

    #[cfg(all(target_arch = "x86_64", target_feature = "sse"))]
    {
        // Safety: We've checked that the sse feature is enabled at compile time.
        unsafe { sse::convolve_sse(input, coeffs) }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // Safety: NEON is mandatory on aarch64, so it's always available.
        unsafe { neon::convolve_neon(input, coeffs) }
    }

    #[cfg(not(any(
        all(target_arch = "x86_64", target_feature = "sse"),
        target_arch = "aarch64"
    )))]
    convolve_scalar(input, coeffs)
}
