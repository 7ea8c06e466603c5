pub mod classify;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod target;

pub use classify::{Category, CategorySelection, Classifier, PatternSet};
pub use error::FetchError;
pub use fetcher::{CookieSource, FetchConfig, FetchOutcome, FetchedPage, Fetcher};
pub use normalize::normalize;
pub use target::Target;
