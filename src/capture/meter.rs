//! Input level metering.
//!
//! Derives a normalized loudness value from a frequency-domain snapshot
//! of the most recent capture window, recomputed every display frame.
//! Purely ephemeral: no state survives beyond the reusable FFT planner.

use rustfft::{num_complex::Complex, FftPlanner};

/// Fixed analysis window size in samples.
pub const ANALYSIS_WINDOW: usize = 256;

/// Per-frame loudness meter over the live capture buffer.
pub struct LevelMeter {
    fft_planner: FftPlanner<f32>,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self {
            fft_planner: FftPlanner::new(),
        }
    }

    /// Normalized loudness in `[0,1]` for the tail of `samples`.
    ///
    /// Takes the last [`ANALYSIS_WINDOW`] samples, applies a Hann window,
    /// and averages the magnitude across the real-frequency bins, scaled
    /// by the maximum magnitude a full-scale windowed input can produce.
    pub fn level(&mut self, samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let tail_len = samples.len().min(ANALYSIS_WINDOW);
        let tail = &samples[samples.len() - tail_len..];

        let mut buffer: Vec<Complex<f32>> = tail
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let window = 0.5
                    * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / tail_len as f32).cos());
                Complex::new(s as f32 * window / 32768.0, 0.0)
            })
            .collect();
        buffer.resize(ANALYSIS_WINDOW, Complex::new(0.0, 0.0));

        let fft = self.fft_planner.plan_fft_forward(ANALYSIS_WINDOW);
        fft.process(&mut buffer);

        let bins = ANALYSIS_WINDOW / 2;
        let mean_magnitude: f32 =
            buffer[..bins].iter().map(|c| c.norm()).sum::<f32>() / bins as f32;

        // A full-scale windowed input sums to at most N/2 across the Hann
        // window, bounding every bin magnitude.
        let max_magnitude = ANALYSIS_WINDOW as f32 / 2.0;

        (mean_magnitude / max_magnitude).clamp(0.0, 1.0)
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, period: usize, amplitude: i16) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / period as f32;
                (phase.sin() * amplitude as f32) as i16
            })
            .collect()
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(LevelMeter::new().level(&[]), 0.0);
    }

    #[test]
    fn silence_is_zero() {
        let level = LevelMeter::new().level(&[0; 1024]);
        assert_eq!(level, 0.0);
    }

    #[test]
    fn level_is_always_in_unit_range() {
        let mut meter = LevelMeter::new();
        let inputs: Vec<Vec<i16>> = vec![
            vec![i16::MAX; 4096],
            vec![i16::MIN; 4096],
            sine(1000, 7, i16::MAX),
            sine(100, 64, 1200),
            vec![-3; 17], // shorter than the analysis window
        ];
        for input in inputs {
            let level = meter.level(&input);
            assert!((0.0..=1.0).contains(&level), "level {level} out of range");
        }
    }

    #[test]
    fn louder_input_meters_higher() {
        let mut meter = LevelMeter::new();
        let quiet = meter.level(&sine(512, 32, 800));
        let loud = meter.level(&sine(512, 32, 24_000));
        assert!(loud > quiet);
    }

    #[test]
    fn only_the_window_tail_matters() {
        let mut meter = LevelMeter::new();
        // Loud prefix followed by a silent window: the meter reads silence.
        let mut samples = vec![20_000i16; 1024];
        samples.extend_from_slice(&[0; ANALYSIS_WINDOW]);
        assert_eq!(meter.level(&samples), 0.0);
    }
}
