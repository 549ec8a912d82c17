use crate::foundation::error::{PosterError, PosterResult};

/// Separable gaussian weights in Q16 fixed point; sums to exactly `1 << 16`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GaussianKernel {
    weights: Vec<u32>,
}

impl GaussianKernel {
    pub(crate) fn new(radius: u32, sigma: f32) -> PosterResult<Self> {
        if radius == 0 {
            return Ok(Self {
                weights: vec![1 << 16],
            });
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(PosterError::validation("blur sigma must be > 0"));
        }

        let r = radius as i64;
        let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
        let raw: Vec<f64> = (-r..=r)
            .map(|i| (-((i * i) as f64) / denom).exp())
            .collect();
        let sum: f64 = raw.iter().sum();

        let mut weights: Vec<u32> = raw
            .iter()
            .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
            .collect();
        // Rounding drift goes to the centre tap so flat regions stay flat.
        let total: i64 = weights.iter().map(|&w| i64::from(w)).sum();
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + 65536 - total).clamp(0, 65536) as u32;

        Ok(Self { weights })
    }

    pub(crate) fn radius(&self) -> usize {
        self.weights.len() / 2
    }
}

/// Gaussian blur over premultiplied RGBA8 with clamped edges.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> PosterResult<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PosterError::validation("blur buffer size overflow"))?;
    if src.len() != expected {
        return Err(PosterError::validation(format!(
            "blur expects {expected} bytes for {width}x{height}, got {}",
            src.len()
        )));
    }
    if radius == 0 || expected == 0 {
        return Ok(src.to_vec());
    }

    let kernel = GaussianKernel::new(radius, sigma)?;
    let (w, h) = (width as usize, height as usize);
    let mut tmp = vec![0u8; expected];
    let mut out = vec![0u8; expected];
    // Rows then columns: `len` samples per line, `step` pixels between samples.
    convolve(src, &mut tmp, &kernel, h, w, |line, i| line * w + i);
    convolve(&tmp, &mut out, &kernel, w, h, |line, i| i * w + line);
    Ok(out)
}

fn convolve(
    src: &[u8],
    dst: &mut [u8],
    kernel: &GaussianKernel,
    lines: usize,
    len: usize,
    index: impl Fn(usize, usize) -> usize,
) {
    let r = kernel.radius() as isize;
    let last = len as isize - 1;
    for line in 0..lines {
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (k, &weight) in kernel.weights.iter().enumerate() {
                let s = (i as isize + k as isize - r).clamp(0, last) as usize;
                let px = index(line, s) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(weight) * u64::from(src[px + c]);
                }
            }
            let px = index(line, i) * 4;
            for (c, a) in acc.into_iter().enumerate() {
                dst[px + c] = ((a + 32768) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
