//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Reports only need filled
//! rectangles, stroked lines, single-line text in two standard fonts, and
//! the occasional chart bitmap, so the subset is small.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::{encode_win_ansi, StandardFont};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::model::Metadata;

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    font_objects: Vec<(StandardFont, usize)>,
    /// Image XObject ids, referenced as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// For each page, the image index of each image element in draw order.
    page_images: Vec<Vec<usize>>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            page_images: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, images, then page objects and content streams
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: vec![] });
        }

        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let font_resources = self.build_font_resource_dict(&builder.font_objects);
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in pages.iter().enumerate() {
            let images = builder.page_images[page_idx].clone();
            let content = self.build_content_stream(page, &images);
            let compressed = compress_to_vec_zlib(&content, 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let xobjects: Vec<String> = images
                .iter()
                .map(|&idx| format!("/Im{} {} 0 R", idx, builder.image_objects[idx]))
                .collect();
            let resources = if xobjects.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!(
                    "/Font << {} >> /XObject << {} >>",
                    font_resources,
                    xobjects.join(" ")
                )
            };

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(PdfObject {
            data: self.build_info_dict(metadata),
        });

        self.serialize(&builder, info_obj_id)
    }

    fn build_info_dict(&self, metadata: &Metadata) -> Vec<u8> {
        let mut info: Vec<u8> = b"<< /Title (".to_vec();
        info.extend(escape_pdf_bytes(&encode_win_ansi(&metadata.title)));
        info.extend_from_slice(b") /Author (");
        info.extend(escape_pdf_bytes(&encode_win_ansi(&metadata.author)));
        info.extend_from_slice(b") ");
        if let Some(subject) = &metadata.subject {
            info.extend_from_slice(b"/Subject (");
            info.extend(escape_pdf_bytes(&encode_win_ansi(subject)));
            info.extend_from_slice(b") ");
        }
        let _ = write!(
            info,
            "/CreationDate (D:{}000000) /Producer (salesprint {}) /Creator (salesprint) >>",
            metadata.created_on.format("%Y%m%d"),
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, images: &[usize]) -> Vec<u8> {
        let mut stream: Vec<u8> = Vec::new();
        let mut next_image = images.iter();

        for element in &page.elements {
            let image_idx = match element.draw {
                DrawCommand::Image { .. } => next_image.next().copied(),
                _ => None,
            };
            self.write_element(&mut stream, element, page.height, image_idx);
        }

        stream
    }

    /// Write a single layout element as PDF operators. Layout y runs down
    /// the page; PDF y runs up, so every y is flipped against the height.
    fn write_element(
        &self,
        stream: &mut Vec<u8>,
        element: &LayoutElement,
        page_height: f64,
        image_idx: Option<usize>,
    ) {
        match &element.draw {
            DrawCommand::Rect { fill } => {
                if fill.a <= 0.0 {
                    return;
                }
                let y = page_height - element.y - element.height;
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                    fill.r, fill.g, fill.b, element.x, y, element.width, element.height
                );
            }

            DrawCommand::Text {
                content,
                font,
                size,
                color,
            } => {
                let _ = write!(
                    stream,
                    "BT\n{:.3} {:.3} {:.3} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n(",
                    color.r,
                    color.g,
                    color.b,
                    font.resource_name(),
                    size,
                    element.x,
                    page_height - element.y
                );
                stream.extend(escape_pdf_bytes(&encode_win_ansi(content)));
                stream.extend_from_slice(b") Tj\nET\n");
            }

            DrawCommand::Line {
                x2,
                y2,
                width,
                color,
            } => {
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    color.r,
                    color.g,
                    color.b,
                    width,
                    element.x,
                    page_height - element.y,
                    x2,
                    page_height - y2
                );
            }

            DrawCommand::Image { .. } => {
                // register_images indexes every image element in page order.
                if let Some(idx) = image_idx {
                    let y = page_height - element.y - element.height;
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        element.width, element.height, element.x, y, idx
                    );
                }
            }
        }
    }

    /// Register the standard fonts used across all pages. Helvetica is
    /// always present so every page has a font resource.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut fonts: Vec<StandardFont> = vec![StandardFont::Helvetica];
        for element in pages.iter().flat_map(|p| &p.elements) {
            if let DrawCommand::Text { font, .. } = element.draw {
                fonts.push(font);
            }
        }
        fonts.sort();
        fonts.dedup();

        for font in fonts {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .map(|(font, obj_id)| format!("/{} {} 0 R", font.resource_name(), obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for page in pages {
            let mut indices = Vec::new();
            for element in &page.elements {
                if let DrawCommand::Image { image } = &element.draw {
                    let xobj_id = Self::write_image_xobject(builder, image);
                    indices.push(builder.image_objects.len());
                    builder.image_objects.push(xobj_id);
                }
            }
            builder.page_images.push(indices);
        }
    }

    /// Write one image as one or two XObjects (image plus optional SMask).
    /// Returns the main XObject id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                Self::push_image_stream(builder, image, color_space, "/DCTDecode", data, None)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed = compress_to_vec_zlib(alpha_data, 6);
                    Self::push_image_stream(
                        builder,
                        image,
                        "/DeviceGray",
                        "/FlateDecode",
                        &compressed,
                        None,
                    )
                });
                let compressed = compress_to_vec_zlib(rgb, 6);
                Self::push_image_stream(
                    builder,
                    image,
                    "/DeviceRGB",
                    "/FlateDecode",
                    &compressed,
                    smask_id,
                )
            }
        }
    }

    fn push_image_stream(
        builder: &mut PdfBuilder,
        image: &LoadedImage,
        color_space: &str,
        filter: &str,
        bytes: &[u8],
        smask_id: Option<usize>,
    ) -> usize {
        let obj_id = builder.objects.len();
        let smask_ref = smask_id
            .map(|id| format!(" /SMask {} 0 R", id))
            .unwrap_or_default();
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace {} /BitsPerComponent 8 /Filter {} /Length {}{} >>\nstream\n",
            image.width_px,
            image.height_px,
            color_space,
            filter,
            bytes.len(),
            smask_ref
        );
        data.extend_from_slice(bytes);
        data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject { data });
        obj_id
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

/// Escape the delimiters of a PDF literal string.
fn escape_pdf_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
    out
}
