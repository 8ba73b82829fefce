//! Company fundamentals: statement-derived metrics, competitive and industry
//! context, and the final investment recommendation.

pub mod company;
pub mod competitive;
pub mod financials;
pub mod industry;
pub mod recommendation;

pub use company::{CompanyInfo, CompanySummary};
pub use competitive::*;
pub use financials::*;
pub use industry::*;
pub use recommendation::*;
