//! Card layout: text measurement, placed elements and the composition rules.

pub mod element;
pub mod metrics;
pub mod rules;

pub use element::{Border, CardLayout, Element, ElementRole, Placed, TextRun};
pub use metrics::{ApproxMetrics, TextMeasure, TextWeight, fit_text};
pub use rules::{LOGO_PLACEHOLDER, layout_card, palette};
