//! EXIF/ICC metadata carry-over.
//!
//! Extraction and re-attachment are both best-effort: a source without
//! parseable metadata yields an empty blob, and a target format that cannot
//! hold the blob (or a container that fails to parse) keeps the encoded
//! bytes as-is. Neither direction ever surfaces an error.

use bytes::Bytes;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{ImageEXIF, ImageICC};
use tracing::debug;

use crate::format::OutputFormat;

/// Metadata lifted from a source image, carried verbatim to the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlob {
    /// Raw EXIF payload, if the source carried one.
    pub exif: Option<Bytes>,
    /// Raw ICC profile, if the source carried one.
    pub icc: Option<Bytes>,
}

impl MetadataBlob {
    /// True when there is nothing to re-attach.
    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.icc.is_none()
    }
}

/// Pull EXIF/ICC out of the source bytes. JPEG and PNG sources yield both;
/// anything else yields an empty blob.
pub(crate) fn extract(bytes: &[u8]) -> MetadataBlob {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => match Jpeg::from_bytes(Bytes::copy_from_slice(bytes)) {
            Ok(jpeg) => MetadataBlob {
                exif: jpeg.exif(),
                icc: jpeg.icc_profile(),
            },
            Err(err) => {
                debug!(%err, "source jpeg not parseable for metadata");
                MetadataBlob::default()
            }
        },
        Ok(image::ImageFormat::Png) => match Png::from_bytes(Bytes::copy_from_slice(bytes)) {
            Ok(png) => MetadataBlob {
                exif: png.exif(),
                icc: png.icc_profile(),
            },
            Err(err) => {
                debug!(%err, "source png not parseable for metadata");
                MetadataBlob::default()
            }
        },
        _ => MetadataBlob::default(),
    }
}

/// Re-attach `metadata` to freshly encoded bytes when the target format can
/// hold it. Returns the input unchanged on any failure.
pub(crate) fn attach(encoded: Vec<u8>, format: OutputFormat, metadata: &MetadataBlob) -> Vec<u8> {
    if metadata.is_empty() {
        return encoded;
    }
    match format {
        OutputFormat::Jpeg | OutputFormat::Jpg => attach_jpeg(encoded, metadata),
        OutputFormat::Png => attach_png(encoded, metadata),
        _ => {
            debug!(%format, "target format does not carry metadata, skipping");
            encoded
        }
    }
}

fn attach_jpeg(encoded: Vec<u8>, metadata: &MetadataBlob) -> Vec<u8> {
    let original = Bytes::from(encoded);
    let mut jpeg = match Jpeg::from_bytes(original.clone()) {
        Ok(jpeg) => jpeg,
        Err(err) => {
            debug!(%err, "encoded jpeg not parseable, skipping metadata");
            return original.to_vec();
        }
    };
    if metadata.exif.is_some() {
        jpeg.set_exif(metadata.exif.clone());
    }
    if metadata.icc.is_some() {
        jpeg.set_icc_profile(metadata.icc.clone());
    }
    let mut out = Vec::new();
    match jpeg.encoder().write_to(&mut out) {
        Ok(_) => out,
        Err(err) => {
            debug!(%err, "could not rewrite jpeg with metadata, skipping");
            original.to_vec()
        }
    }
}

fn attach_png(encoded: Vec<u8>, metadata: &MetadataBlob) -> Vec<u8> {
    let original = Bytes::from(encoded);
    let mut png = match Png::from_bytes(original.clone()) {
        Ok(png) => png,
        Err(err) => {
            debug!(%err, "encoded png not parseable, skipping metadata");
            return original.to_vec();
        }
    };
    if metadata.exif.is_some() {
        png.set_exif(metadata.exif.clone());
    }
    if metadata.icc.is_some() {
        png.set_icc_profile(metadata.icc.clone());
    }
    let mut out = Vec::new();
    match png.encoder().write_to(&mut out) {
        Ok(_) => out,
        Err(err) => {
            debug!(%err, "could not rewrite png with metadata, skipping");
            original.to_vec()
        }
    }
}
