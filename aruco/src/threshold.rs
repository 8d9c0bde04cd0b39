use crate::image::ImageU8;

/// Global threshold level chosen by Otsu's method.
///
/// Maximizes the between-class variance of the 256-bin histogram. Pixels
/// strictly above the returned level belong to the bright class.
pub fn otsu_level(img: &ImageU8) -> u8 {
    let mut hist = [0u64; 256];
    for y in 0..img.height {
        for x in 0..img.width {
            hist[img.get(x, y) as usize] += 1;
        }
    }

    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0;
    }
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(v, &n)| v as f64 * n as f64)
        .sum();

    let mut sum_dark = 0.0f64;
    let mut n_dark = 0u64;
    let mut best = 0.0f64;
    let mut level = 0u8;

    for (t, &n) in hist.iter().enumerate() {
        n_dark += n;
        if n_dark == 0 {
            continue;
        }
        let n_bright = total - n_dark;
        if n_bright == 0 {
            break;
        }
        sum_dark += t as f64 * n as f64;

        let mean_dark = sum_dark / n_dark as f64;
        let mean_bright = (sum_all - sum_dark) / n_bright as f64;
        let between = n_dark as f64 * n_bright as f64 * (mean_dark - mean_bright).powi(2);
        if between > best {
            best = between;
            level = t as u8;
        }
    }

    level
}

/// Two-level image: 255 where the pixel is above `level`, 0 elsewhere.
pub fn binarize(img: &ImageU8, level: u8) -> ImageU8 {
    let mut out = ImageU8::new(img.width, img.height);
    for y in 0..img.height {
        for x in 0..img.width {
            if img.get(x, y) > level {
                out.set(x, y, 255);
            }
        }
    }
    out
}

/// Binarize with the Otsu level of the image itself.
pub fn binarize_otsu(img: &ImageU8) -> ImageU8 {
    binarize(img, otsu_level(img))
}
