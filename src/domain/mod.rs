pub mod headline;
pub mod state;
pub mod summary;

pub use headline::{Headline, HeadlineId};
pub use state::{FetchState, Phase};
pub use summary::NewsSummary;
