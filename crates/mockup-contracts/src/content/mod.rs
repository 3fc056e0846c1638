mod parts;
mod resolver;

pub use parts::{ContentPart, ContentRequest, ImageConfig};
pub use resolver::{
    resolve_analysis, resolve_image, response_parts, ResponsePart, ANALYSIS_FALLBACK,
};
