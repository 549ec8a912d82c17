use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder as _};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::export::request::RenderedAsset;
use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;
use crate::foundation::error::{PosterError, PosterResult};
use crate::state::poster::ExportFormat;

/// Points per inch in PDF user space.
const PDF_POINTS_PER_INCH: f64 = 72.0;

/// Encode a composited poster into `format`.
///
/// `quality` (`0..=1`) drives JPEG compression, including the JPEG embedded in a PDF.
/// `pdf_dpi` sets the physical page size of PDF output.
#[tracing::instrument(skip(image), fields(w = image.width, h = image.height))]
pub fn encode(
    image: &RasterImage,
    format: ExportFormat,
    quality: f64,
    pdf_dpi: f64,
) -> PosterResult<RenderedAsset> {
    let bytes = match format {
        ExportFormat::Png => encode_png(image)?,
        ExportFormat::Jpg => encode_jpeg(image, quality)?,
        ExportFormat::Pdf => {
            let jpeg = encode_jpeg(image, quality)?;
            wrap_pdf(&jpeg, image.width, image.height, pdf_dpi)?
        }
    };
    tracing::debug!(bytes = bytes.len(), format = format.extension(), "encoded");
    Ok(RenderedAsset {
        bytes,
        mime_type: format.mime_type(),
        width: image.width,
        height: image.height,
    })
}

pub fn encode_png(image: &RasterImage) -> PosterResult<Vec<u8>> {
    let rgba = image.to_straight();
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut buf))
        .write_image(&rgba, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| PosterError::encoding(format!("png: {e}")))?;
    Ok(buf)
}

/// JPEG has no alpha; translucent pixels are flattened onto white.
pub fn encode_jpeg(image: &RasterImage, quality: f64) -> PosterResult<Vec<u8>> {
    let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let rgb = flatten_rgb(image, Color::WHITE);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, q)
        .encode(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| PosterError::encoding(format!("jpeg: {e}")))?;
    Ok(buf)
}

fn flatten_rgb(image: &RasterImage, backdrop: Color) -> Vec<u8> {
    let back = [backdrop.r, backdrop.g, backdrop.b];
    let mut out = Vec::with_capacity(image.width as usize * image.height as usize * 3);
    for px in image.rgba8_premul.chunks_exact(4) {
        let inv = 255 - u16::from(px[3]);
        for c in 0..3 {
            // Premultiplied source over an opaque backdrop.
            let v = u16::from(px[c]) + (u16::from(back[c]) * inv + 127) / 255;
            out.push(v.min(255) as u8);
        }
    }
    out
}

/// Single-page PDF whose page is exactly the image at `dpi`.
pub fn wrap_pdf(jpeg: &[u8], width: u32, height: u32, dpi: f64) -> PosterResult<Vec<u8>> {
    if !(dpi.is_finite() && dpi > 0.0) {
        return Err(PosterError::encoding(format!("pdf dpi must be positive, got {dpi}")));
    }
    let page_w = f64::from(width) * PDF_POINTS_PER_INCH / dpi;
    let page_h = f64::from(height) * PDF_POINTS_PER_INCH / dpi;

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w as f32),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_h as f32),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Poster".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| PosterError::encoding(format!("pdf content: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page_w as f32),
            Object::Real(page_h as f32),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Poster" => image_id },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PosterError::encoding(format!("pdf: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
