pub mod partner;
pub mod promotion;

pub use partner::PartnerApplication;
pub use promotion::PromotionApplication;

use crate::validation::{validate_fields, FieldErrors, FieldSpec, RawForm};

/// A lead-capture form whose validated submissions become one row of a
/// worksheet in the external store.
pub trait Application: Sized {
    /// Short name used in log events.
    const KIND: &'static str;
    /// Worksheet that receives the rows.
    const TABLE: &'static str;
    /// Route serving the form; successful submissions redirect back here.
    const PATH: &'static str;
    /// Page template containing `{{flash}}` and `{{form}}` placeholders.
    const TEMPLATE: &'static str;
    const SUCCESS_MESSAGE: &'static str;
    const FIELDS: &'static [FieldSpec];

    /// Builds the record from values in `FIELDS` order.
    fn from_values(values: Vec<String>) -> Self;

    /// Row values in `FIELDS` order.
    fn to_row(&self) -> Vec<String>;

    fn validate(raw: &RawForm) -> Result<Self, FieldErrors> {
        validate_fields(Self::FIELDS, raw).map(Self::from_values)
    }

    fn headers() -> Vec<String> {
        Self::FIELDS.iter().map(|f| f.header.to_string()).collect()
    }
}
