pub mod config;
pub mod handlers;
pub mod pages;
pub mod rate_limit;
pub mod search;

pub use config::Config;
pub use handlers::{AppState, router};
pub use search::{MAX_QUERY_LEN, SearchOutcome, parse_noun_query, search_noun};
