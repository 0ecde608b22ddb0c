//! Logo and font resources.

pub mod decode;
pub mod fonts;
pub mod logo;

pub use decode::{PreparedImage, decode_image};
pub use fonts::{FontConfig, FontFace, FontSet, TextShaper};
pub use logo::{LogoFetcher, decode_data_uri};
