use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Raw url-encoded form body, keyed by field name.
pub type RawForm = HashMap<String, String>;

pub const PHONE_PATTERN: &str = r"^[0-9]{10}$";
pub const PHONE_MESSAGE: &str = "Phone number must be exactly 10 digits";
pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const EMAIL_MESSAGE: &str = "Invalid email address.";
pub const CHOICE_MESSAGE: &str = "Not a valid choice.";

/// Error key for problems with the submission as a whole.
pub const FORM_LEVEL: &str = "__form__";

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("email pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Text,
    Email,
    Tel,
    TextArea,
    Select(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Non-blank; stops the remaining rules of the field on failure.
    Required,
    Length { min: Option<usize>, max: Option<usize> },
    Email,
    Phone,
    /// Value must be one of the option keys.
    OneOf(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Column header in the external table.
    pub header: &'static str,
    pub widget: Widget,
    pub rules: &'static [Rule],
}

/// Per-field error messages, kept in field order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

fn check_rule(rule: &Rule, value: &str) -> Result<(), String> {
    match rule {
        Rule::Required => {
            if value.trim().is_empty() {
                return Err(REQUIRED_MESSAGE.to_string());
            }
        }
        Rule::Length { min, max } => {
            let len = value.chars().count();
            let too_short = min.map_or(false, |m| len < m);
            let too_long = max.map_or(false, |m| len > m);
            if too_short || too_long {
                return Err(match (min, max) {
                    (Some(min), Some(max)) => {
                        format!("Field must be between {} and {} characters long.", min, max)
                    }
                    (None, Some(max)) => format!("Field cannot be longer than {} characters.", max),
                    (Some(min), None) => format!("Field must be at least {} characters long.", min),
                    (None, None) => return Ok(()),
                });
            }
        }
        Rule::Email => {
            if !EMAIL_RE.is_match(value) {
                return Err(EMAIL_MESSAGE.to_string());
            }
        }
        Rule::Phone => {
            if !PHONE_RE.is_match(value) {
                return Err(PHONE_MESSAGE.to_string());
            }
        }
        Rule::OneOf(choices) => {
            if !choices.iter().any(|(key, _)| *key == value) {
                return Err(CHOICE_MESSAGE.to_string());
            }
        }
    }
    Ok(())
}

/// Runs every field's rules against the raw input. On success returns the
/// values in field order; missing fields count as empty.
pub fn validate_fields(fields: &[FieldSpec], raw: &RawForm) -> Result<Vec<String>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut values = Vec::with_capacity(fields.len());

    for field in fields {
        let value = raw.get(field.name).map(String::as_str).unwrap_or("");
        for rule in field.rules {
            if let Err(message) = check_rule(rule, value) {
                errors.push(field.name, message);
                if matches!(rule, Rule::Required) {
                    break;
                }
            }
        }
        values.push(value.to_string());
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: &[(&str, &str)] = &[("s", "Small"), ("l", "Large")];

    const FIELDS: &[FieldSpec] = &[
        FieldSpec {
            name: "title",
            label: "Title",
            header: "Title",
            widget: Widget::Text,
            rules: &[Rule::Required, Rule::Length { min: Some(2), max: Some(5) }],
        },
        FieldSpec {
            name: "notes",
            label: "Notes",
            header: "Notes",
            widget: Widget::TextArea,
            rules: &[Rule::Length { min: None, max: Some(3) }],
        },
        FieldSpec {
            name: "size",
            label: "Size",
            header: "Size",
            widget: Widget::Select(SIZES),
            rules: &[Rule::Required, Rule::OneOf(SIZES)],
        },
    ];

    fn raw(pairs: &[(&str, &str)]) -> RawForm {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn valid_input_yields_values_in_field_order() {
        let values = validate_fields(FIELDS, &raw(&[("size", "l"), ("title", "abc")])).unwrap();
        assert_eq!(values, vec!["abc", "", "l"]);
    }

    #[test]
    fn required_failure_stops_remaining_rules() {
        let errors = validate_fields(FIELDS, &raw(&[("size", "s")])).unwrap_err();
        assert_eq!(errors.get("title"), &[REQUIRED_MESSAGE.to_string()]);
        assert!(errors.get("notes").is_empty());
    }

    #[test]
    fn whitespace_only_is_not_present() {
        let errors = validate_fields(FIELDS, &raw(&[("title", "   "), ("size", "s")])).unwrap_err();
        assert_eq!(errors.get("title"), &[REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn length_bounds_are_inclusive_and_count_chars() {
        assert!(validate_fields(FIELDS, &raw(&[("title", "ab"), ("size", "s")])).is_ok());
        assert!(validate_fields(FIELDS, &raw(&[("title", "ééééé"), ("size", "s")])).is_ok());

        let errors = validate_fields(FIELDS, &raw(&[("title", "a"), ("size", "s")])).unwrap_err();
        assert_eq!(errors.get("title"), &["Field must be between 2 and 5 characters long.".to_string()]);

        let errors = validate_fields(FIELDS, &raw(&[("title", "ab"), ("notes", "long"), ("size", "s")])).unwrap_err();
        assert_eq!(errors.get("notes"), &["Field cannot be longer than 3 characters.".to_string()]);
    }

    #[test]
    fn choice_must_be_an_option_key_not_a_label() {
        let errors = validate_fields(FIELDS, &raw(&[("title", "ab"), ("size", "Large")])).unwrap_err();
        assert_eq!(errors.get("size"), &[CHOICE_MESSAGE.to_string()]);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["size"]);
    }

    #[test]
    fn phone_rule_needs_exactly_ten_digits() {
        for ok in ["9876543210", "0000000000"] {
            assert!(check_rule(&Rule::Phone, ok).is_ok(), "{ok}");
        }
        for bad in ["98765", "98765432101", "98765-43210", "+919876543210", "987654321a", " 9876543210"] {
            assert_eq!(check_rule(&Rule::Phone, bad), Err(PHONE_MESSAGE.to_string()), "{bad}");
        }
    }

    #[test]
    fn email_grammar() {
        for ok in ["raj@example.com", "first.last+tag@mail.co.in"] {
            assert!(check_rule(&Rule::Email, ok).is_ok(), "{ok}");
        }
        for bad in ["raj", "raj@", "@example.com", "raj@example", "raj @example.com", "raj@exa mple.com"] {
            assert_eq!(check_rule(&Rule::Email, bad), Err(EMAIL_MESSAGE.to_string()), "{bad}");
        }
    }
}
