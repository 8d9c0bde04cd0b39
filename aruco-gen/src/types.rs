/// Color of a rendered marker cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    /// Background: the border ring and 0 bits.
    Black,
    /// Foreground: 1 bits.
    White,
}

impl Pixel {
    /// 8-bit gray value.
    pub fn gray(self) -> u8 {
        match self {
            Pixel::Black => 0,
            Pixel::White => 255,
        }
    }
}
