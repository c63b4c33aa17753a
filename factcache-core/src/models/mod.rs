pub mod fact;
pub mod verification;

pub use fact::{NewQueryFact, QueryFact};
pub use verification::{Verdict, VerificationSummary};
