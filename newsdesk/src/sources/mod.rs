pub mod http_ads;
pub mod static_ads;

pub use http_ads::HttpAdSource;
pub use static_ads::StaticAdSource;
