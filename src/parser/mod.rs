//! Natural language parsing for Portuguese scheduling requests
//!
//! Two independent passes run over the same user message: `date_expr` pulls
//! out the calendar day being talked about, `time_pref` pulls out the hour
//! range and target hour. Both are total functions driven by ordered rule
//! tables; text that matches nothing resolves to documented defaults instead
//! of an error, so a garbled message can never break the scheduling flow.

pub mod date_expr;
pub mod time_pref;

pub use date_expr::ParsedDate;
pub use time_pref::{PreferenceMode, TimePreference};
