// Resume screening core.
// Heuristic text analysis only: date extraction, section location, experience estimation,
// keyword matching, ATS compliance, and score aggregation. Text comes from `extraction`.

pub mod aggregate;
pub mod ats;
pub mod dates;
pub mod experience;
pub mod handlers;
pub mod keywords;
pub mod pipeline;
pub mod sections;
