//! Built-in Templates
//!
//! Default markup of the payment step. Shops replace them by registering
//! other templates and pointing the `CHECKOUT_PAYMENT_TEMPLATE_*` settings
//! at them.

use std::fmt::Write;

use checkout_core::config::{DEFAULT_PAYMENT_TEMPLATE_BODY, DEFAULT_PAYMENT_TEMPLATE_HEADER};
use checkout_core::render::escape_html;
use checkout_core::{AttributeDefinition, AttributeType, CheckoutView, TemplateRenderer};
use checkout_payment::{PARAM_ATTRIBUTES, PARAM_OPTION};

/// Renderer with the default payment templates registered
pub fn renderer() -> TemplateRenderer {
    TemplateRenderer::new()
        .with_template(DEFAULT_PAYMENT_TEMPLATE_BODY, payment_body)
        .with_template(DEFAULT_PAYMENT_TEMPLATE_HEADER, payment_header)
}

fn payment_header(view: &CheckoutView) -> String {
    format!(
        "<link rel=\"stylesheet\" href=\"/css/checkout-payment.css\">{}",
        view.payment_header
    )
}

fn payment_body(view: &CheckoutView) -> String {
    let selected = view.params.ids(PARAM_OPTION).unwrap_or_default();
    let mut html = String::from("<section class=\"checkout-standard-payment\">\n<h1>Payment</h1>\n");

    if !view.payment_error.is_empty() {
        html.push_str("<ul class=\"error-list\">\n");
        for message in view.payment_error.values() {
            let _ = writeln!(html, "<li>{}</li>", escape_html(message));
        }
        html.push_str("</ul>\n");
    }

    for option in &view.payment_options {
        let id = escape_html(&option.id);
        let checked = if selected.contains(&option.id) { " checked" } else { "" };

        let _ = writeln!(
            html,
            "<div class=\"item-service\">\n<input type=\"radio\" name=\"{PARAM_OPTION}\" id=\"c_payment-{id}\" value=\"{id}\"{checked}>\n<label for=\"c_payment-{id}\">{} <span class=\"costs\">{} {}</span></label>",
            escape_html(&option.service.label),
            option.price.costs,
            escape_html(&option.price.currency),
        );

        for attribute in &option.attributes {
            html.push_str(&attribute_input(&option.id, attribute, view));
        }

        html.push_str("</div>\n");
    }

    html.push_str(&view.payment_body);
    html.push_str("</section>\n");
    html
}

fn attribute_input(option_id: &str, attribute: &AttributeDefinition, view: &CheckoutView) -> String {
    let name = format!(
        "{PARAM_ATTRIBUTES}[{}][{}]",
        escape_html(option_id),
        escape_html(&attribute.code)
    );
    let value = view
        .params
        .get(&format!("{PARAM_ATTRIBUTES}/{option_id}/{}", attribute.code))
        .or(attribute.default.as_ref())
        .map(|v| v.as_str().map_or_else(|| v.to_string(), String::from))
        .unwrap_or_default();
    let error_class = if view.payment_error.contains_key(&attribute.code) { " error" } else { "" };
    let required = if attribute.required { " required" } else { "" };

    let input = match &attribute.kind {
        AttributeType::Select { options } => {
            let mut select = format!("<select name=\"{name}\"{required}>");
            for opt in options {
                let sel = if *opt == value { " selected" } else { "" };
                let opt = escape_html(opt);
                let _ = write!(select, "<option value=\"{opt}\"{sel}>{opt}</option>");
            }
            select.push_str("</select>");
            select
        }
        AttributeType::Boolean => {
            let checked = if matches!(value.as_str(), "1" | "true") { " checked" } else { "" };
            format!("<input type=\"checkbox\" name=\"{name}\" value=\"1\"{checked}>")
        }
        AttributeType::Number => {
            format!("<input type=\"number\" name=\"{name}\" value=\"{}\"{required}>", escape_html(&value))
        }
        AttributeType::String => {
            format!("<input type=\"text\" name=\"{name}\" value=\"{}\"{required}>", escape_html(&value))
        }
    };

    format!(
        "<div class=\"form-item{error_class}\"><label>{}</label>{input}</div>\n",
        escape_html(&attribute.label)
    )
}
