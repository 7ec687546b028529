use std::io::Cursor;

use font8x8::UnicodeFonts;
use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([28, 30, 36, 255]);
const BORDER: Rgba<u8> = Rgba([70, 74, 84, 255]);
const TEXT: Rgba<u8> = Rgba([200, 204, 214, 255]);

/// Stand-in tile for an app whose icon could not be fetched: a dark square
/// with `label` centred in an 8x8 bitmap font, encoded as PNG.
pub fn placeholder_icon_png(width: u32, height: u32, label: &str) -> anyhow::Result<Vec<u8>> {
    if width == 0 || height == 0 {
        anyhow::bail!("placeholder icon must have a non-zero size");
    }

    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, BACKGROUND);
    draw_border(&mut img, BORDER);
    draw_text_centered(&mut img, label, TEXT);

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

fn draw_border(img: &mut RgbaImage, c: Rgba<u8>) {
    let (w, h) = img.dimensions();
    fill_rect(img, 0, 0, w, 1, c);
    fill_rect(img, 0, h - 1, w, 1, c);
    fill_rect(img, 0, 0, 1, h, c);
    fill_rect(img, w - 1, 0, 1, h, c);
}

fn draw_text_centered(img: &mut RgbaImage, text: &str, color: Rgba<u8>) {
    let scale: u32 = ((img.height() as f32 / 64.0).clamp(1.0, 4.0)).round() as u32;
    let char_w = 8 * scale;
    let char_h = 8 * scale;

    let max_chars = (img.width().saturating_sub(2 * scale) / char_w) as usize;
    let printable: Vec<char> = text.chars().take(max_chars).collect();
    if printable.is_empty() {
        return;
    }

    let text_w = (printable.len() as u32) * char_w;
    let x0 = img.width().saturating_sub(text_w) / 2;
    let y0 = img.height().saturating_sub(char_h) / 2;

    for (i, ch) in printable.iter().enumerate() {
        draw_char(img, x0 + (i as u32) * char_w, y0, *ch, scale, color);
    }
}

fn draw_char(img: &mut RgbaImage, x0: u32, y0: u32, ch: char, scale: u32, color: Rgba<u8>) {
    let glyph = font8x8::BASIC_FONTS
        .get(ch)
        .or_else(|| font8x8::BASIC_FONTS.get('?'));
    let Some(rows) = glyph else {
        return;
    };

    for (row, bits) in rows.iter().copied().enumerate() {
        for col in 0..8 {
            if (bits >> col) & 1 == 0 {
                continue;
            }
            // font8x8 stores the leftmost pixel in the lowest bit.
            let px = x0 + col as u32 * scale;
            let py = y0 + row as u32 * scale;
            fill_rect(img, px, py, scale, scale, color);
        }
    }
}

fn fill_rect(img: &mut RgbaImage, x0: u32, y0: u32, w: u32, h: u32, c: Rgba<u8>) {
    for y in y0..y0.saturating_add(h) {
        if y >= img.height() {
            break;
        }
        for x in x0..x0.saturating_add(w) {
            if x >= img.width() {
                break;
            }
            img.put_pixel(x, y, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_png_of_requested_size() {
        let png = placeholder_icon_png(96, 64, "app12").unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (96, 64));
    }

    #[test]
    fn label_pixels_are_drawn() {
        let png = placeholder_icon_png(64, 64, "X").unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert!(img.pixels().any(|p| *p == TEXT));
        assert_eq!(*img.get_pixel(0, 0), BORDER);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(placeholder_icon_png(0, 10, "x").is_err());
    }
}
