use ndarray::{s, ArrayView3, ArrayViewMut3};

/// An image buffer: contiguous RGB or RGBA bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; targets handed to the
/// compositors are always 3-channel RGB.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    /// A frame of the given size filled with one RGB color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height, 3)
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (w, h) = img.dimensions();
        Self::new(img.into_raw(), w, h, 3)
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        Self::new(img.into_raw(), w, h, 4)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGB triple at `(x, y)`; any alpha channel is ignored.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Drops any alpha channel, returning an RGB copy. Gray frames are
    /// expanded to three equal channels.
    pub fn to_rgb(&self) -> Frame {
        if self.channels == 3 {
            return self.clone();
        }
        let view = self.as_ndarray();
        let data = if self.channels > 3 {
            view.slice(s![.., .., 0..3]).iter().copied().collect()
        } else {
            view.slice(s![.., .., 0]).iter().flat_map(|&v| [v, v, v]).collect()
        };
        Frame::new(data, self.width, self.height, 3)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * (self.channels as usize)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
