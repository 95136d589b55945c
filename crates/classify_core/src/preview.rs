use std::fmt;

use crate::InputId;

/// Image container detected from the leading bytes of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    Detected(image::ImageFormat),
    #[default]
    Unknown,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        match image::guess_format(bytes) {
            Ok(format) => ImageFormat::Detected(format),
            Err(_) => ImageFormat::Unknown,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Detected(format) => format.to_mime_type(),
            ImageFormat::Unknown => "application/octet-stream",
        }
    }
}

impl From<image::ImageFormat> for ImageFormat {
    fn from(format: image::ImageFormat) -> Self {
        ImageFormat::Detected(format)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Detected(format) => match format.extensions_str().first() {
                Some(ext) => f.write_str(&ext.to_ascii_uppercase()),
                None => write!(f, "{format:?}"),
            },
            ImageFormat::Unknown => f.write_str("unknown format"),
        }
    }
}

/// Displayable stand-in for the selected image.
///
/// Owned by the selected input; dropping the input releases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef {
    pub id: InputId,
    pub file_name: String,
    pub byte_len: usize,
    pub format: ImageFormat,
}

impl PreviewRef {
    pub(crate) fn derive(id: InputId, file_name: &str, bytes: &[u8]) -> Self {
        Self {
            id,
            file_name: file_name.to_string(),
            byte_len: bytes.len(),
            format: ImageFormat::sniff(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageFormat, PreviewRef};

    #[test]
    fn sniffs_common_formats() {
        let cases: [(&[u8], image::ImageFormat); 6] = [
            (b"\x89PNG\r\n\x1a\nrest", image::ImageFormat::Png),
            (&[0xFF, 0xD8, 0xFF, 0xE0], image::ImageFormat::Jpeg),
            (b"GIF89a....", image::ImageFormat::Gif),
            (b"RIFF\0\0\0\0WEBPVP8 ", image::ImageFormat::WebP),
            (b"II*\0\x08\0\0\0", image::ImageFormat::Tiff),
            (&[0, 0, 1, 0, 1, 0, 16, 16], image::ImageFormat::Ico),
        ];
        for (bytes, expected) in cases {
            assert_eq!(ImageFormat::sniff(bytes), ImageFormat::Detected(expected));
        }
    }

    #[test]
    fn tiff_and_ico_keep_their_mime_type() {
        let tiff = ImageFormat::sniff(b"MM\0*\0\0\0\x08");
        assert_eq!(tiff.mime_type(), "image/tiff");
        let ico = ImageFormat::sniff(&[0, 0, 1, 0, 1, 0, 16, 16]);
        assert_ne!(ico.mime_type(), "application/octet-stream");
        assert_eq!(ImageFormat::sniff(b"\x89PNG\r\n\x1a\n").mime_type(), "image/png");
    }

    #[test]
    fn short_or_foreign_payloads_are_unknown() {
        assert_eq!(ImageFormat::sniff(b""), ImageFormat::Unknown);
        assert_eq!(ImageFormat::sniff(b"RIFF1234"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::sniff(b"plain text"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::Unknown.mime_type(), "application/octet-stream");
        assert_eq!(ImageFormat::Unknown.to_string(), "unknown format");
    }

    #[test]
    fn preview_records_name_and_size() {
        let preview = PreviewRef::derive(3, "apple.png", b"\x89PNG\r\n\x1a\n1234");
        assert_eq!(preview.id, 3);
        assert_eq!(preview.file_name, "apple.png");
        assert_eq!(preview.byte_len, 12);
        assert_eq!(preview.format, ImageFormat::Detected(image::ImageFormat::Png));
        assert_eq!(preview.format.to_string(), "PNG");
    }
}
