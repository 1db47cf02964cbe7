use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("scene error: {0}")]
    Scene(#[from] luma_core::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("scene contains no primitives")]
    NoPrimitives,
}
