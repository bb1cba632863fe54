//! Target color selection from a lens texture.

use image::RgbaImage;

use crate::shared::constants::{
    DOMINANT_COLOR_CLUSTERS, DOMINANT_COLOR_MAX_ITERS, OPAQUE_ALPHA_THRESHOLD,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorEstimate {
    /// Centroid of the most populated color cluster.
    pub dominant: [u8; 3],
    pub average: [u8; 3],
}

/// Estimates the lens's dominant and average colors over its opaque pixels
/// (all pixels when none is opaque). `None` for an empty image.
pub fn estimate_colors(pixels: &RgbaImage) -> Option<ColorEstimate> {
    let mut samples: Vec<[f64; 3]> = pixels
        .pixels()
        .filter(|p| p.0[3] > OPAQUE_ALPHA_THRESHOLD)
        .map(|p| [p.0[0] as f64, p.0[1] as f64, p.0[2] as f64])
        .collect();
    if samples.is_empty() {
        samples = pixels
            .pixels()
            .map(|p| [p.0[0] as f64, p.0[1] as f64, p.0[2] as f64])
            .collect();
    }
    if samples.is_empty() {
        return None;
    }

    let mean = centroid(samples.iter());
    let average = to_rgb(mean);
    let dominant = if samples.len() < DOMINANT_COLOR_CLUSTERS {
        average
    } else {
        to_rgb(kmeans_dominant(&samples, mean, DOMINANT_COLOR_CLUSTERS))
    };
    log::info!("Lens color: dominant={dominant:?} average={average:?}");
    Some(ColorEstimate { dominant, average })
}

/// Deterministic k-means; returns the centroid of the largest cluster.
///
/// Seeds are picked farthest-point first, starting from the sample farthest
/// from the mean.
fn kmeans_dominant(samples: &[[f64; 3]], mean: [f64; 3], k: usize) -> [f64; 3] {
    let farthest = |dists: &[f64]| {
        dists
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &d)| if d > best.1 { (i, d) } else { best })
            .0
    };
    let to_mean: Vec<f64> = samples.iter().map(|s| dist_sq(s, &mean)).collect();
    let mut centers = vec![samples[farthest(&to_mean)]];
    let mut nearest: Vec<f64> = samples.iter().map(|s| dist_sq(s, &centers[0])).collect();
    while centers.len() < k {
        let seed = samples[farthest(&nearest)];
        centers.push(seed);
        for (n, s) in nearest.iter_mut().zip(samples) {
            *n = n.min(dist_sq(s, &seed));
        }
    }

    let mut labels = vec![usize::MAX; samples.len()];
    for _ in 0..DOMINANT_COLOR_MAX_ITERS {
        let mut changed = false;
        for (label, s) in labels.iter_mut().zip(samples) {
            let best = closest(&centers, s);
            if *label != best {
                *label = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        for (c, center) in centers.iter_mut().enumerate() {
            let members = samples
                .iter()
                .zip(&labels)
                .filter(|(_, &l)| l == c)
                .map(|(s, _)| s);
            if labels.iter().any(|&l| l == c) {
                *center = centroid(members);
            }
        }
    }

    let mut counts = vec![0usize; centers.len()];
    for &l in &labels {
        counts[l] += 1;
    }
    let largest = counts
        .iter()
        .enumerate()
        .fold(0, |best, (i, &n)| if n > counts[best] { i } else { best });
    centers[largest]
}

fn closest(centers: &[[f64; 3]], s: &[f64; 3]) -> usize {
    centers
        .iter()
        .enumerate()
        .fold((0, f64::MAX), |best, (i, c)| {
            let d = dist_sq(s, c);
            if d < best.1 {
                (i, d)
            } else {
                best
            }
        })
        .0
}

fn centroid<'a>(samples: impl Iterator<Item = &'a [f64; 3]>) -> [f64; 3] {
    let mut sum = [0.0; 3];
    let mut n = 0usize;
    for s in samples {
        for c in 0..3 {
            sum[c] += s[c];
        }
        n += 1;
    }
    let n = n.max(1) as f64;
    sum.map(|v| v / n)
}

fn dist_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

fn to_rgb(c: [f64; 3]) -> [u8; 3] {
    c.map(|v| v.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_solid_texture() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([30, 90, 160, 255]));
        let est = estimate_colors(&img).unwrap();
        assert_eq!(est.dominant, [30, 90, 160]);
        assert_eq!(est.average, [30, 90, 160]);
    }

    #[test]
    fn test_majority_color_dominates() {
        // 70% blue, 20% brown, 10% white.
        let img = RgbaImage::from_fn(10, 10, |x, _| match x {
            0..=6 => Rgba([20, 40, 200, 255]),
            7..=8 => Rgba([110, 70, 30, 255]),
            _ => Rgba([250, 250, 250, 255]),
        });
        let est = estimate_colors(&img).unwrap();
        assert_eq!(est.dominant, [20, 40, 200]);
        assert_ne!(est.average, est.dominant);
    }

    #[test]
    fn test_transparent_pixels_ignored() {
        let img = RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgba([200, 0, 0, 0])
            } else {
                Rgba([0, 150, 0, 255])
            }
        });
        let est = estimate_colors(&img).unwrap();
        assert_eq!(est.average, [0, 150, 0]);
        assert_eq!(est.dominant, [0, 150, 0]);
    }

    #[test]
    fn test_fully_transparent_uses_all_pixels() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 0]));
        assert_eq!(estimate_colors(&img).unwrap().average, [10, 20, 30]);
    }

    #[test]
    fn test_fewer_pixels_than_clusters_uses_average() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([100, 100, 100, 255])
            }
        });
        let est = estimate_colors(&img).unwrap();
        assert_eq!(est.dominant, [50, 50, 50]);
        assert_eq!(est.average, [50, 50, 50]);
    }

    #[test]
    fn test_empty_image() {
        assert!(estimate_colors(&RgbaImage::new(0, 0)).is_none());
    }
}
