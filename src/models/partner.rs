use super::Application;
use crate::validation::{FieldSpec, Rule, Widget};

pub const CUISINE_TYPES: &[(&str, &str)] = &[
    ("indian", "Indian"),
    ("chinese", "Chinese"),
    ("italian", "Italian"),
    ("mexican", "Mexican"),
    ("fast_food", "Fast Food"),
    ("south_indian", "South Indian"),
    ("north_indian", "North Indian"),
    ("continental", "Continental"),
    ("desserts", "Desserts"),
    ("beverages", "Beverages"),
    ("other", "Other"),
];

pub const EXPERIENCE_LEVELS: &[(&str, &str)] = &[
    ("new", "New Restaurant"),
    ("1-2", "1-2 Years"),
    ("3-5", "3-5 Years"),
    ("5+", "5+ Years"),
];

const PARTNER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "restaurant_name",
        label: "Restaurant Name",
        header: "Restaurant Name",
        widget: Widget::Text,
        rules: &[Rule::Required, Rule::Length { min: Some(2), max: Some(100) }],
    },
    FieldSpec {
        name: "owner_name",
        label: "Owner Name",
        header: "Owner Name",
        widget: Widget::Text,
        rules: &[Rule::Required, Rule::Length { min: Some(2), max: Some(50) }],
    },
    FieldSpec {
        name: "email",
        label: "Email",
        header: "Email",
        widget: Widget::Email,
        rules: &[Rule::Required, Rule::Email],
    },
    FieldSpec {
        name: "phone",
        label: "Phone Number",
        header: "Phone",
        widget: Widget::Tel,
        rules: &[Rule::Required, Rule::Phone],
    },
    FieldSpec {
        name: "address",
        label: "Restaurant Address",
        header: "Address",
        widget: Widget::TextArea,
        rules: &[Rule::Required, Rule::Length { min: Some(10), max: Some(200) }],
    },
    FieldSpec {
        name: "cuisine_type",
        label: "Cuisine Type",
        header: "Cuisine Type",
        widget: Widget::Select(CUISINE_TYPES),
        rules: &[Rule::Required, Rule::OneOf(CUISINE_TYPES)],
    },
    FieldSpec {
        name: "experience",
        label: "Restaurant Experience",
        header: "Experience",
        widget: Widget::Select(EXPERIENCE_LEVELS),
        rules: &[Rule::Required, Rule::OneOf(EXPERIENCE_LEVELS)],
    },
    FieldSpec {
        name: "description",
        label: "Restaurant Description",
        header: "Description",
        widget: Widget::TextArea,
        rules: &[Rule::Length { min: None, max: Some(500) }],
    },
];

/// Restaurant partner signup.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerApplication {
    pub restaurant_name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub cuisine_type: String,
    pub experience: String,
    pub description: String,
}

impl Application for PartnerApplication {
    const KIND: &'static str = "partner";
    const TABLE: &'static str = "Partners";
    const PATH: &'static str = "/become-partner";
    const TEMPLATE: &'static str = include_str!("../../assets/partner_form.html");
    const SUCCESS_MESSAGE: &'static str =
        "Thank you! Your partner application has been submitted successfully.";
    const FIELDS: &'static [FieldSpec] = PARTNER_FIELDS;

    fn from_values(values: Vec<String>) -> Self {
        let mut it = values.into_iter();
        let mut next = || it.next().unwrap_or_default();
        PartnerApplication {
            restaurant_name: next(),
            owner_name: next(),
            email: next(),
            phone: next(),
            address: next(),
            cuisine_type: next(),
            experience: next(),
            description: next(),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.restaurant_name.clone(),
            self.owner_name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
            self.cuisine_type.clone(),
            self.experience.clone(),
            self.description.clone(),
        ]
    }
}
