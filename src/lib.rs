#![forbid(unsafe_code)]

//! Company card images rendered two ways from one layout: a server rasterizer fed by URL
//! query parameters, and an exporter that captures a live, composed card node.

pub mod assets;
pub mod card;
pub mod export;
pub mod foundation;
pub mod layout;
pub mod render;
pub mod server;

pub use assets::{FontConfig, FontSet, LogoFetcher, PreparedImage};
pub use card::{Batch, CardForm, CardModel, FormInput, LogoRef, TagSet, parse_query, to_query_string};
pub use export::{
    CaptureBackend, CardNode, CpuCapture, DirectorySink, ExportOutcome, Exporter, LogoState,
    MemorySink, SaveSink, SvgCapture, export_file_name,
};
pub use foundation::{
    core::{Canvas, Rgba8},
    error::{CardError, CardResult},
};
pub use layout::{ApproxMetrics, CardLayout, ElementRole, TextMeasure, layout_card};
pub use render::{CardRenderer, PainterKind, encode_png};
pub use server::{AppState, ServerConfig};
