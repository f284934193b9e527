pub mod content;
pub mod link;
pub mod report;
pub mod result;
pub mod session;

pub use content::{GeneratedBy, GeneratedContent};
pub use link::ProductLink;
pub use report::{
    Diagnostics, DynamicStatus, MediaCandidates, ProductReport, MAX_CANDIDATES,
};
pub use result::{non_empty, ScrapeResult, Source};
pub use session::{parse_cookie_header, LoginSession, SessionCookie};
