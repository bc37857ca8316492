pub mod fields;
pub mod html;
pub mod store;

pub use fields::{parse_number, BudgetType, ExperienceLevel, Field, FormState, Visibility};
pub use html::strip_html;
pub use store::{FieldErrors, FormStore};
