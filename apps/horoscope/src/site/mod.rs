pub mod assets;
pub mod index;
pub mod pipeline;
pub mod seo;
pub mod static_pages;
