use super::Application;
use crate::validation::{FieldSpec, Rule, Widget};

pub const DEAL_PREFERENCES: &[(&str, &str)] = &[
    ("barter_only", "Barter Deal Only"),
    ("payment_only", "Payment Deal Only"),
    ("any_works", "Any one of them works"),
];

// Audience and pricing figures are free text; only presence is checked.
const PROMOTION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        header: "Name",
        widget: Widget::Text,
        rules: &[Rule::Required, Rule::Length { min: Some(2), max: Some(100) }],
    },
    FieldSpec {
        name: "instagram_id",
        label: "Instagram ID",
        header: "Instagram ID",
        widget: Widget::Text,
        rules: &[Rule::Required, Rule::Length { min: Some(1), max: Some(100) }],
    },
    FieldSpec {
        name: "city",
        label: "City",
        header: "City",
        widget: Widget::Text,
        rules: &[Rule::Required, Rule::Length { min: Some(2), max: Some(100) }],
    },
    FieldSpec {
        name: "followers",
        label: "Followers",
        header: "Followers",
        widget: Widget::Text,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "avg_story_views",
        label: "Avg. Story Views",
        header: "Avg Story Views",
        widget: Widget::Text,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "avg_reel_views",
        label: "Avg. Reel Views",
        header: "Avg Reel Views",
        widget: Widget::Text,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "story_charges",
        label: "Story Charges",
        header: "Story Charges",
        widget: Widget::Text,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "reel_charges",
        label: "Reel Charges",
        header: "Reel Charges",
        widget: Widget::Text,
        rules: &[Rule::Required],
    },
    FieldSpec {
        name: "interested_for",
        label: "Interested for",
        header: "Interested For",
        widget: Widget::Select(DEAL_PREFERENCES),
        rules: &[Rule::Required, Rule::OneOf(DEAL_PREFERENCES)],
    },
    FieldSpec {
        name: "contact_number",
        label: "Contact Number",
        header: "Contact Number",
        widget: Widget::Tel,
        rules: &[Rule::Required, Rule::Phone],
    },
];

/// Social-media creator signup for promoting the app.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionApplication {
    pub name: String,
    pub instagram_id: String,
    pub city: String,
    pub followers: String,
    pub avg_story_views: String,
    pub avg_reel_views: String,
    pub story_charges: String,
    pub reel_charges: String,
    pub interested_for: String,
    pub contact_number: String,
}

impl Application for PromotionApplication {
    const KIND: &'static str = "promotion";
    const TABLE: &'static str = "Promote";
    const PATH: &'static str = "/promote-us";
    const TEMPLATE: &'static str = include_str!("../../assets/promote_us.html");
    const SUCCESS_MESSAGE: &'static str =
        "Thank you! Your promotion application has been submitted successfully.";
    const FIELDS: &'static [FieldSpec] = PROMOTION_FIELDS;

    fn from_values(values: Vec<String>) -> Self {
        let mut it = values.into_iter();
        let mut next = || it.next().unwrap_or_default();
        PromotionApplication {
            name: next(),
            instagram_id: next(),
            city: next(),
            followers: next(),
            avg_story_views: next(),
            avg_reel_views: next(),
            story_charges: next(),
            reel_charges: next(),
            interested_for: next(),
            contact_number: next(),
        }
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.instagram_id.clone(),
            self.city.clone(),
            self.followers.clone(),
            self.avg_story_views.clone(),
            self.avg_reel_views.clone(),
            self.story_charges.clone(),
            self.reel_charges.clone(),
            self.interested_for.clone(),
            self.contact_number.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{RawForm, CHOICE_MESSAGE, PHONE_MESSAGE, REQUIRED_MESSAGE};

    fn creator() -> RawForm {
        [
            ("name", "Asha Rao"),
            ("instagram_id", "@asha.eats"),
            ("city", "Pune"),
            ("followers", "12.5k"),
            ("avg_story_views", "1500"),
            ("avg_reel_views", "about 4000"),
            ("story_charges", "Rs 800"),
            ("reel_charges", "negotiable"),
            ("interested_for", "any_works"),
            ("contact_number", "9123456780"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn numeric_looking_fields_accept_free_text() {
        let app = PromotionApplication::validate(&creator()).expect("valid");
        assert_eq!(app.followers, "12.5k");
        assert_eq!(app.reel_charges, "negotiable");
        assert_eq!(app.to_row().len(), PromotionApplication::headers().len());
        assert_eq!(app.to_row()[8], "any_works");
    }

    #[test]
    fn numeric_looking_fields_are_still_required() {
        let mut raw = creator();
        raw.insert("followers".into(), String::new());
        raw.remove("story_charges");
        let errors = PromotionApplication::validate(&raw).unwrap_err();
        assert_eq!(errors.get("followers"), &[REQUIRED_MESSAGE.to_string()]);
        assert_eq!(errors.get("story_charges"), &[REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn contact_number_must_be_ten_digits() {
        for bad in ["912345678", "91234 56780", "+919123456780"] {
            let mut raw = creator();
            raw.insert("contact_number".into(), bad.into());
            let errors = PromotionApplication::validate(&raw).unwrap_err();
            assert_eq!(errors.get("contact_number"), &[PHONE_MESSAGE.to_string()], "{bad}");
        }
    }

    #[test]
    fn interested_for_uses_option_keys() {
        let mut raw = creator();
        raw.insert("interested_for".into(), "Barter Deal Only".into());
        let errors = PromotionApplication::validate(&raw).unwrap_err();
        assert_eq!(errors.get("interested_for"), &[CHOICE_MESSAGE.to_string()]);

        raw.insert("interested_for".into(), "barter_only".into());
        assert!(PromotionApplication::validate(&raw).is_ok());
    }

    #[test]
    fn headers_follow_declared_order() {
        assert_eq!(
            PromotionApplication::headers(),
            vec![
                "Name", "Instagram ID", "City", "Followers", "Avg Story Views",
                "Avg Reel Views", "Story Charges", "Reel Charges", "Interested For", "Contact Number",
            ]
        );
    }
}
