//! Content module - post models, normalization, reading time and pagination

mod normalize;
mod pagination;
mod post;
mod reading_time;

pub use normalize::{normalize, normalize_detail, normalize_page};
pub use pagination::{load_next_page, PostFeed};
pub use post::{ContentBlock, Post, PostDetail, PostPage};
pub use reading_time::{estimate_read_minutes, word_count, WORDS_PER_MINUTE};
