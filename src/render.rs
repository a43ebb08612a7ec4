use crate::models::Application;
use crate::session::{FlashMessage, CSRF_FIELD};
use crate::validation::{FieldErrors, FieldSpec, RawForm, Widget, FORM_LEVEL};

pub const INDEX_HTML: &str = include_str!("../assets/index.html");

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_flash(flash: Option<&FlashMessage>) -> String {
    match flash {
        Some(f) => format!(
            "<div class=\"flash flash-{}\">{}</div>",
            escape_html(&f.category),
            escape_html(&f.message)
        ),
        None => String::new(),
    }
}

fn render_errors(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape_html(m)))
        .collect();
    format!("<ul class=\"errors\">{}</ul>", items)
}

fn render_input(field: &FieldSpec, value: &str) -> String {
    let name = field.name;
    let value = escape_html(value);
    match field.widget {
        Widget::Text => format!("<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\">"),
        Widget::Email => format!("<input type=\"email\" id=\"{name}\" name=\"{name}\" value=\"{value}\">"),
        Widget::Tel => format!("<input type=\"tel\" id=\"{name}\" name=\"{name}\" value=\"{value}\">"),
        Widget::TextArea => format!("<textarea id=\"{name}\" name=\"{name}\">{value}</textarea>"),
        Widget::Select(choices) => {
            let options: String = choices
                .iter()
                .map(|(key, label)| {
                    let selected = if escape_html(key) == value { " selected" } else { "" };
                    format!("<option value=\"{}\"{}>{}</option>", escape_html(key), selected, escape_html(label))
                })
                .collect();
            format!("<select id=\"{name}\" name=\"{name}\">{options}</select>")
        }
    }
}

/// Renders the form fields with preserved values and per-field errors.
pub fn render_form<A: Application>(values: &RawForm, errors: &FieldErrors, csrf_token: &str) -> String {
    let mut html = format!(
        "<form method=\"post\" action=\"{}\" novalidate>\n<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
        A::PATH,
        CSRF_FIELD,
        escape_html(csrf_token)
    );
    html.push_str(&render_errors(errors.get(FORM_LEVEL)));
    html.push_str(&render_errors(errors.get(CSRF_FIELD)));

    for field in A::FIELDS {
        let value = values.get(field.name).map(String::as_str).unwrap_or("");
        let has_errors = !errors.get(field.name).is_empty();
        html.push_str(&format!(
            "<div class=\"field{}\">\n<label for=\"{}\">{}</label>\n{}\n{}</div>\n",
            if has_errors { " has-error" } else { "" },
            field.name,
            escape_html(field.label),
            render_input(field, value),
            render_errors(errors.get(field.name)),
        ));
    }

    html.push_str("<button type=\"submit\">Submit</button>\n</form>");
    html
}

pub fn render_page<A: Application>(
    values: &RawForm,
    errors: &FieldErrors,
    csrf_token: &str,
    flash: Option<&FlashMessage>,
) -> String {
    A::TEMPLATE
        .replace("{{flash}}", &render_flash(flash))
        .replace("{{form}}", &render_form::<A>(values, errors, csrf_token))
}
