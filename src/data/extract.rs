use image::{GrayImage, Luma, RgbImage};

use super::model::{ImageSample, ImageStats};

/// Reduce every pixel to the maximum of its red, green and blue channels.
///
/// The input is already RGB, so any alpha channel of the source file has
/// been dropped by the loader and never takes part in the maximum.
pub fn intensity_map(raw: &RgbImage) -> GrayImage {
    let (width, height) = raw.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = raw.get_pixel(x, y).0;
        Luma([r.max(g).max(b)])
    })
}

/// Mean and population standard deviation of an intensity map.
///
/// Returns `None` for an empty map.
pub fn stats(intensity: &GrayImage) -> Option<ImageStats> {
    let n = intensity.as_raw().len();
    if n == 0 {
        return None;
    }
    let count = n as f64;
    let mean = intensity.as_raw().iter().map(|&v| v as f64).sum::<f64>() / count;
    let variance = intensity
        .as_raw()
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / count;
    Some(ImageStats {
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Build the full sample for one image: intensity map plus statistics.
pub fn extract(raw: RgbImage) -> Option<ImageSample> {
    let intensity = intensity_map(&raw);
    let stats = stats(&intensity)?;
    Some(ImageSample {
        raw,
        intensity,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    #[test]
    fn intensity_is_channel_maximum() {
        let mut raw = RgbImage::new(2, 1);
        raw.put_pixel(0, 0, Rgb([10, 200, 30]));
        raw.put_pixel(1, 0, Rgb([90, 5, 40]));

        let map = intensity_map(&raw);
        assert_eq!(map.get_pixel(0, 0).0, [200]);
        assert_eq!(map.get_pixel(1, 0).0, [90]);
    }

    #[test]
    fn alpha_does_not_contribute() {
        // Bright alpha over a dark pixel must stay dark.
        let rgba = image::RgbaImage::from_pixel(3, 3, image::Rgba([12, 7, 3, 255]));
        let raw = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

        let sample = extract(raw).unwrap();
        assert_relative_eq!(sample.stats.mean, 12.0);
        assert_relative_eq!(sample.stats.std_dev, 0.0);
    }

    #[test]
    fn population_statistics() {
        // Intensities 0, 0, 255, 255: mean 127.5, population sigma 127.5.
        let mut raw = RgbImage::new(2, 2);
        raw.put_pixel(1, 0, Rgb([255, 0, 0]));
        raw.put_pixel(1, 1, Rgb([0, 0, 255]));

        let s = extract(raw).unwrap().stats;
        assert_relative_eq!(s.mean, 127.5);
        assert_relative_eq!(s.std_dev, 127.5);
    }

    #[test]
    fn mean_matches_map_and_stays_in_range() {
        let raw = RgbImage::from_fn(17, 9, |x, y| {
            Rgb([(x * 13 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8])
        });
        let sample = extract(raw).unwrap();

        let direct = sample.intensity.as_raw().iter().map(|&v| v as f64).sum::<f64>()
            / sample.intensity.as_raw().len() as f64;
        assert_relative_eq!(sample.stats.mean, direct, epsilon = 1e-12);
        assert!((0.0..=255.0).contains(&sample.stats.mean));
    }

    #[test]
    fn empty_image_has_no_stats() {
        assert!(extract(RgbImage::new(0, 0)).is_none());
    }
}
