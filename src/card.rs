//! The card data model and its two input boundaries: URL query parameters and the form.

pub mod defaults;
pub mod form;
pub mod model;
pub mod query;

pub use form::{CardForm, FormInput};
pub use model::{Batch, CardModel, CardStatus, LogoRef, TagSet};
pub use query::{parse_query, share_url, to_query_string};
