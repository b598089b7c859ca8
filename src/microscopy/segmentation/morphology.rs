//! Grayscale erosion, dilation and opening over a square window.
//!
//! Pixels within `kernel / 2` of the border are copied through unchanged.

use crate::microscopy::common::{AnalysisError, Cancellation, Result};
use crate::microscopy::raster::ChannelPlane;

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

fn check_kernel(kernel: usize) -> Result<()> {
    if kernel == 0 || kernel % 2 == 0 {
        return Err(AnalysisError::InvalidKernel(kernel));
    }
    Ok(())
}

fn filter(
    plane: &ChannelPlane,
    kernel: usize,
    op: Extremum,
    cancel: &Cancellation,
) -> Result<ChannelPlane> {
    check_kernel(kernel)?;
    let (width, height) = plane.dimensions();
    let radius = kernel / 2;
    let mut output = plane.clone();
    if width < kernel || height < kernel || radius == 0 {
        return Ok(output);
    }

    let src = plane.data();
    let dst = output.data_mut();
    for y in radius..height - radius {
        cancel.check()?;
        for x in radius..width - radius {
            let mut acc = match op {
                Extremum::Min => u8::MAX,
                Extremum::Max => u8::MIN,
            };
            for wy in y - radius..=y + radius {
                let row = &src[wy * width + x - radius..=wy * width + x + radius];
                acc = match op {
                    Extremum::Min => row.iter().fold(acc, |a, &v| a.min(v)),
                    Extremum::Max => row.iter().fold(acc, |a, &v| a.max(v)),
                };
            }
            dst[y * width + x] = acc;
        }
    }
    Ok(output)
}

/// Local minimum over a `kernel` x `kernel` window.
pub fn erode(plane: &ChannelPlane, kernel: usize, cancel: &Cancellation) -> Result<ChannelPlane> {
    filter(plane, kernel, Extremum::Min, cancel)
}

/// Local maximum over a `kernel` x `kernel` window.
pub fn dilate(plane: &ChannelPlane, kernel: usize, cancel: &Cancellation) -> Result<ChannelPlane> {
    filter(plane, kernel, Extremum::Max, cancel)
}

/// Erosion followed by dilation.
pub fn open(plane: &ChannelPlane, kernel: usize, cancel: &Cancellation) -> Result<ChannelPlane> {
    let eroded = erode(plane, kernel, cancel)?;
    dilate(&eroded, kernel, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_spot(size: usize, x: usize, y: usize) -> ChannelPlane {
        let mut plane = ChannelPlane::filled(size, size, 0);
        plane.data_mut()[y * size + x] = 255;
        plane
    }

    #[test]
    fn test_opening_removes_isolated_pixel() {
        let opened = open(&with_spot(7, 3, 3), 3, &Cancellation::none()).unwrap();
        assert!(opened.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_opening_keeps_large_block() {
        let mut plane = ChannelPlane::filled(9, 9, 0);
        for y in 2..7 {
            for x in 2..7 {
                plane.data_mut()[y * 9 + x] = 200;
            }
        }
        let opened = open(&plane, 3, &Cancellation::none()).unwrap();
        assert_eq!(opened, plane);
    }

    #[test]
    fn test_border_strip_is_identity() {
        let plane = with_spot(5, 0, 2);
        let eroded = erode(&plane, 3, &Cancellation::none()).unwrap();
        assert_eq!(eroded.get(0, 2), 255);
    }

    #[test]
    fn test_dilate_spreads_to_window() {
        let dilated = dilate(&with_spot(5, 2, 2), 3, &Cancellation::none()).unwrap();
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(dilated.get(x, y), 255);
            }
        }
        assert_eq!(dilated.get(0, 0), 0);
    }

    #[test]
    fn test_plane_smaller_than_kernel_unchanged() {
        let plane = with_spot(2, 1, 1);
        assert_eq!(open(&plane, 3, &Cancellation::none()).unwrap(), plane);
    }

    #[test]
    fn test_even_kernel_rejected() {
        let plane = ChannelPlane::filled(4, 4, 0);
        assert!(matches!(
            open(&plane, 2, &Cancellation::none()),
            Err(AnalysisError::InvalidKernel(2))
        ));
    }
}
