use tracing::debug;

use crate::microscopy::common::{AnalysisError, Cancellation, Result};
use crate::microscopy::raster::RgbaBuffer;

/// Largest number of layers whose 8-bit components still sum into a `u16`.
pub const MAX_COMPOSITE_LAYERS: usize = (u16::MAX / u8::MAX as u16) as usize;

/// Running composite of colorized layers.
///
/// Keeps three `u16` sums and a `u16` count per pixel, so memory stays at
/// 8 bytes per pixel for up to [`MAX_COMPOSITE_LAYERS`] layers.
///
/// A layer contributes at a pixel when its alpha is non-zero and at least one
/// color component is non-zero. The final color is the sum over contributing
/// layers divided by their count, so the result does not depend on layer order.
#[derive(Debug, Clone)]
pub struct CompositeAccumulator {
    width: usize,
    height: usize,
    sums: Vec<[u16; 3]>,
    counts: Vec<u16>,
    layers: usize,
}

impl CompositeAccumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sums: vec![[0; 3]; width * height],
            counts: vec![0; width * height],
            layers: 0,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    pub fn add_layer(&mut self, layer: &RgbaBuffer, cancel: &Cancellation) -> Result<()> {
        if layer.dimensions() != (self.width, self.height) {
            return Err(AnalysisError::DimensionMismatch {
                expected: (self.width, self.height),
                actual: layer.dimensions(),
            });
        }
        if self.layers >= MAX_COMPOSITE_LAYERS {
            return Err(AnalysisError::TooManyLayers(self.layers + 1));
        }

        let data = layer.data();
        for y in 0..self.height {
            cancel.check()?;
            let start = y * self.width;
            for i in start..start + self.width {
                let px = &data[i * 4..i * 4 + 4];
                if px[3] == 0 || (px[0] == 0 && px[1] == 0 && px[2] == 0) {
                    continue;
                }
                let sum = &mut self.sums[i];
                sum[0] += px[0] as u16;
                sum[1] += px[1] as u16;
                sum[2] += px[2] as u16;
                self.counts[i] += 1;
            }
        }

        self.layers += 1;
        Ok(())
    }

    pub fn finish(self) -> RgbaBuffer {
        debug!(
            layers = self.layers,
            width = self.width,
            height = self.height,
            "Finishing composite"
        );

        let mut output = RgbaBuffer::transparent(self.width, self.height);
        let out = output.data_mut();
        for (i, (sum, &count)) in self.sums.iter().zip(&self.counts).enumerate() {
            if count == 0 {
                continue;
            }
            let px = &mut out[i * 4..i * 4 + 4];
            for c in 0..3 {
                px[c] = ((sum[c] as u32 + count as u32 / 2) / count as u32) as u8;
            }
            px[3] = 255;
        }
        output
    }
}

/// Blends equal-sized RGBA layers.
///
/// An empty slice yields an empty buffer.
pub fn composite_layers(layers: &[RgbaBuffer], cancel: &Cancellation) -> Result<RgbaBuffer> {
    let Some(first) = layers.first() else {
        return Ok(RgbaBuffer::transparent(0, 0));
    };

    let (width, height) = first.dimensions();
    if let Some(bad) = layers.iter().find(|l| l.dimensions() != (width, height)) {
        return Err(AnalysisError::DimensionMismatch {
            expected: (width, height),
            actual: bad.dimensions(),
        });
    }

    let mut acc = CompositeAccumulator::new(width, height);
    for layer in layers {
        acc.add_layer(layer, cancel)?;
    }
    Ok(acc.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microscopy::colormap::{ColorCatalog, Colorizer};
    use crate::microscopy::raster::ChannelPlane;

    fn layer(pixels: &[[u8; 4]]) -> RgbaBuffer {
        RgbaBuffer::from_raw(pixels.len(), 1, pixels.concat()).unwrap()
    }

    #[test]
    fn test_average_over_active_layers_only() {
        let red = layer(&[[200, 0, 0, 255], [0, 0, 0, 0]]);
        let green = layer(&[[0, 100, 0, 255], [0, 80, 0, 255]]);
        let out = composite_layers(&[red, green], &Cancellation::none()).unwrap();
        assert_eq!(out.pixel(0, 0), [100, 50, 0, 255]);
        assert_eq!(out.pixel(1, 0), [0, 80, 0, 255]);
    }

    #[test]
    fn test_no_active_layers_is_transparent() {
        let a = layer(&[[0, 0, 0, 0]]);
        let b = layer(&[[0, 0, 0, 255]]);
        let out = composite_layers(&[a, b], &Cancellation::none()).unwrap();
        assert_eq!(out.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_order_invariance() {
        let a = layer(&[[10, 20, 30, 255], [0, 0, 0, 0], [5, 0, 0, 255]]);
        let b = layer(&[[90, 0, 1, 255], [7, 7, 7, 255], [0, 0, 0, 0]]);
        let c = layer(&[[0, 255, 0, 255], [0, 0, 9, 255], [1, 1, 1, 255]]);
        let cancel = Cancellation::none();
        let abc = composite_layers(&[a.clone(), b.clone(), c.clone()], &cancel).unwrap();
        let cba = composite_layers(&[c.clone(), b.clone(), a.clone()], &cancel).unwrap();
        let bac = composite_layers(&[b, a, c], &cancel).unwrap();
        assert_eq!(abc, cba);
        assert_eq!(abc, bac);
    }

    #[test]
    fn test_single_layer_identity() {
        let data: Vec<u8> = (0..64).map(|v| (v * 4) as u8).collect();
        let plane = ChannelPlane::new(8, 8, data).unwrap();
        let color = ColorCatalog::standard().lookup(7).unwrap();
        let cancel = Cancellation::none();
        let direct = Colorizer::default().colorize(&plane, color, 120, &cancel).unwrap();
        let composed = composite_layers(std::slice::from_ref(&direct), &cancel).unwrap();
        assert_eq!(direct, composed);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = RgbaBuffer::transparent(2, 2);
        let b = RgbaBuffer::transparent(3, 2);
        let err = composite_layers(&[a, b], &Cancellation::none()).unwrap_err();
        assert!(matches!(err, AnalysisError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_layer_limit_saturated_without_overflow() {
        let white = layer(&[[255, 255, 255, 255]]);
        let mut acc = CompositeAccumulator::new(1, 1);
        for _ in 0..MAX_COMPOSITE_LAYERS {
            acc.add_layer(&white, &Cancellation::none()).unwrap();
        }
        let err = acc.add_layer(&white, &Cancellation::none()).unwrap_err();
        assert!(matches!(err, AnalysisError::TooManyLayers(n) if n == MAX_COMPOSITE_LAYERS + 1));
        assert_eq!(acc.finish().pixel(0, 0), [255, 255, 255, 255]);
    }
}
