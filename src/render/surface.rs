use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA bytes of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Fixed-size drawing surface written exclusively by the frame compositor.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    /// Allocate a transparent surface of `canvas` size.
    pub fn new(canvas: Canvas) -> ReelResult<Self> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ReelError::configuration("surface width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ReelError::configuration("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(ReelError::configuration("surface width/height must be non-zero"));
        }
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: u32::from(self.pixmap.width()),
            height: u32::from(self.pixmap.height()),
        }
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy the current contents out as a frame.
    pub fn snapshot(&self) -> FrameRGBA {
        let canvas = self.canvas();
        FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("canvas", &self.canvas())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
