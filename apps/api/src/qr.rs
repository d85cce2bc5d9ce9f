//! PNG rendering of product QR labels.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{GrayImage, ImageFormat};
use qrcode::types::Color;
use qrcode::QrCode;
use stockfast_core::qr::{QrEncodeError, QrEncoder};

/// Quiet zone, in modules.
const BORDER: u32 = 4;

/// Renders QR content to a black-on-white PNG `data:` URL.
#[derive(Debug, Clone)]
pub struct PngQrEncoder {
    min_size_px: u32,
}

impl PngQrEncoder {
    /// `min_size_px` is the smallest acceptable edge; modules are scaled by a
    /// whole factor so the result is at least that large.
    pub fn new(min_size_px: u32) -> Self {
        PngQrEncoder {
            min_size_px: min_size_px.max(1),
        }
    }

    fn render(&self, content: &str) -> Result<GrayImage, QrEncodeError> {
        let code = QrCode::new(content.as_bytes())
            .map_err(|e| QrEncodeError::Capacity(e.to_string()))?;

        let modules = code.to_colors();
        let width = code.width() as u32;
        let span = width + BORDER * 2;
        let scale = self.min_size_px.div_ceil(span).max(1);
        let img_size = span * scale;

        let mut img_buf = vec![255u8; (img_size * img_size) as usize];

        for (i, color) in modules.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let x = (i as u32) % width;
            let y = (i as u32) / width;
            let px = (x + BORDER) * scale;
            let py = (y + BORDER) * scale;
            for dy in 0..scale {
                let row = ((py + dy) * img_size) as usize;
                let start = row + px as usize;
                img_buf[start..start + scale as usize].fill(0);
            }
        }

        GrayImage::from_raw(img_size, img_size, img_buf)
            .ok_or_else(|| QrEncodeError::Render("image buffer size mismatch".to_string()))
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode(&self, content: &str) -> Result<String, QrEncodeError> {
        let image = self.render(content)?;

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| QrEncodeError::Render(e.to_string()))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}
