/// Grayscale image with row-major pixel data.
///
/// Binary patches use the same type: any non-zero pixel counts as set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageU8 {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub buf: Vec<u8>,
}

impl ImageU8 {
    /// Create a new image filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create a new image with every pixel set to `val`.
    pub fn filled(width: u32, height: u32, val: u8) -> Self {
        let stride = width;
        let buf = vec![val; (stride * height) as usize];
        Self { width, height, stride, buf }
    }

    /// Create an image from existing pixel data.
    ///
    /// `stride` must be >= `width`, and `buf` must contain at least `stride * height` bytes.
    pub fn from_buf(width: u32, height: u32, stride: u32, buf: Vec<u8>) -> Self {
        assert!(stride >= width);
        assert!(buf.len() >= (stride * height) as usize);
        Self { width, height, stride, buf }
    }

    /// Get the pixel value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.buf[(y * self.stride + x) as usize]
    }

    /// Set the pixel value at (x, y).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: u8) {
        self.buf[(y * self.stride + x) as usize] = val;
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Count non-zero pixels in a rectangle, clipped to the image.
    pub fn count_nonzero(&self, x0: u32, y0: u32, w: u32, h: u32) -> u32 {
        let x1 = (x0 + w).min(self.width);
        let y1 = (y0 + h).min(self.height);
        let mut n = 0;
        for y in y0.min(y1)..y1 {
            let row = (y * self.stride) as usize;
            n += self.buf[row + x0.min(x1) as usize..row + x1 as usize]
                .iter()
                .filter(|&&v| v != 0)
                .count() as u32;
        }
        n
    }

    /// Fill a rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, w: u32, h: u32, val: u8) {
        let x1 = (x0 + w).min(self.width);
        let y1 = (y0 + h).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, val);
            }
        }
    }

    /// Copy `src` into this image with its top-left corner at (x0, y0), clipped.
    pub fn blit(&mut self, src: &ImageU8, x0: u32, y0: u32) {
        for y in 0..src.height {
            for x in 0..src.width {
                let (dx, dy) = (x0 + x, y0 + y);
                if dx < self.width && dy < self.height {
                    self.set(dx, dy, src.get(x, y));
                }
            }
        }
    }

    /// Copy out a rectangle. Panics if it is not inside the image.
    pub fn crop(&self, x0: u32, y0: u32, w: u32, h: u32) -> ImageU8 {
        assert!(x0 + w <= self.width && y0 + h <= self.height);
        let mut out = ImageU8::new(w, h);
        for y in 0..h {
            for x in 0..w {
                out.set(x, y, self.get(x0 + x, y0 + y));
            }
        }
        out
    }

    /// Rotate 90 degrees clockwise: pixel (x, y) moves to (height-1-y, x).
    pub fn rotate90(&self) -> ImageU8 {
        let mut out = ImageU8::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(self.height - 1 - y, x, self.get(x, y));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_zeroed_image() {
        let img = ImageU8::new(10, 8);
        assert_eq!(img.width, 10);
        assert_eq!(img.height, 8);
        assert_eq!(img.stride, 10);
        assert_eq!(img.buf.len(), 80);
        assert!(img.buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn get_set_pixel() {
        let mut img = ImageU8::new(4, 4);
        img.set(2, 3, 128);
        assert_eq!(img.get(2, 3), 128);
        assert_eq!(img.get(0, 0), 0);
    }

    #[test]
    fn from_buf_with_stride() {
        let buf = vec![1, 2, 3, 0, 4, 5, 6, 0]; // stride=4, width=3
        let img = ImageU8::from_buf(3, 2, 4, buf);
        assert_eq!(img.get(0, 0), 1);
        assert_eq!(img.get(2, 0), 3);
        assert_eq!(img.get(0, 1), 4);
        assert_eq!(img.get(2, 1), 6);
    }

    #[test]
    fn count_nonzero_respects_stride_and_clipping() {
        // padding bytes are non-zero and must not be counted
        let buf = vec![1, 0, 9, 0, 1, 9];
        let img = ImageU8::from_buf(2, 2, 3, buf);
        assert_eq!(img.count_nonzero(0, 0, 2, 2), 2);
        assert_eq!(img.count_nonzero(1, 0, 5, 5), 1);
        assert_eq!(img.count_nonzero(0, 1, 2, 1), 1);
        assert_eq!(img.count_nonzero(4, 4, 2, 2), 0);
    }

    #[test]
    fn fill_and_crop() {
        let mut img = ImageU8::new(6, 6);
        img.fill_rect(2, 2, 10, 2, 255);
        assert_eq!(img.count_nonzero(0, 0, 6, 6), 8);
        let c = img.crop(2, 2, 4, 2);
        assert!(c.buf.iter().all(|&v| v == 255));
    }

    #[test]
    fn blit_clips() {
        let mut dst = ImageU8::new(3, 3);
        let src = ImageU8::filled(2, 2, 7);
        dst.blit(&src, 2, 2);
        assert_eq!(dst.get(2, 2), 7);
        assert_eq!(dst.count_nonzero(0, 0, 3, 3), 1);
    }

    #[test]
    fn rotate90_clockwise() {
        let mut img = ImageU8::new(3, 2);
        img.set(0, 0, 1);
        img.set(2, 1, 2);
        let r = img.rotate90();
        assert_eq!((r.width, r.height), (2, 3));
        // top-left goes to top-right
        assert_eq!(r.get(1, 0), 1);
        // bottom-right goes to bottom-left
        assert_eq!(r.get(0, 2), 2);
    }
}
