pub mod defs;
pub mod guardian;

pub use defs::{AdsResponse, PoliticalAd, QuerySpec};
pub use guardian::{
    GuardianArticle, GuardianArticleFields, GuardianEdition, GuardianErrorResponse, GuardianList,
    GuardianListResponse, GuardianSection, GuardianSingle, GuardianSingleResponse, GuardianTag,
};
