use crate::{
    content::{EncodeOptions, ImageContent, ImageFormat},
    error::TransformError,
};

/// Turns file bytes into [`ImageContent`] and back.
pub trait Codec {
    fn decode(&self, bytes: &[u8]) -> Result<ImageContent, TransformError>;

    fn encode(
        &self,
        content: &ImageContent,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, TransformError>;
}

/// Pass-through codec: identifies the format by signature and hands the encoded
/// bytes to the transform untouched.
///
/// It bundles no pixel encoder, so it cannot convert between formats and
/// ignores the JPEG quality. What it does guarantee is that nothing is written
/// back unless it still carries a valid signature of the target format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffCodec;

impl Codec for SniffCodec {
    fn decode(&self, bytes: &[u8]) -> Result<ImageContent, TransformError> {
        let format = ImageFormat::sniff(bytes)
            .ok_or_else(|| TransformError::decode("unrecognised image signature"))?;
        Ok(ImageContent::new(format, bytes.to_vec()))
    }

    fn encode(
        &self,
        content: &ImageContent,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, TransformError> {
        let target = options.target_format(content);
        if target != content.format {
            return Err(TransformError::encode(format!(
                "no encoder bundled to convert {} to {target}",
                content.format
            )));
        }

        match ImageFormat::sniff(&content.bytes) {
            Some(found) if found == target => Ok(content.bytes.clone()),
            Some(found) => Err(TransformError::encode(format!(
                "transform produced {found} data, expected {target}"
            ))),
            None => Err(TransformError::encode(format!(
                "transform output is not valid {target} data"
            ))),
        }
    }
}
