//! HTML markup for the elements the switcher owns.
//!
//! Both the in-memory document (for snapshots and server-side rendering) and
//! the browser backend (for the control body) produce their HTML here, so the
//! two can never disagree about element ids or attributes.

use minijinja::{context, AutoEscape, Environment, Error};
use once_cell::sync::Lazy;

use crate::document::{ControlSpec, StylesheetLink};

const LINK_TEMPLATE: &str =
    r#"<link id="{{ id }}" rel="stylesheet" type="text/css" href="{{ href }}">"#;

const CONTROL_BODY_TEMPLATE: &str = concat!(
    r#"<label for="{{ select_id }}">{{ label }}</label>"#,
    r#"<select id="{{ select_id }}" aria-label="{{ aria_label }}">"#,
    r#"{% for option in options %}"#,
    r#"<option value="{{ option.value }}"{% if option.value == selected %} selected{% endif %}>{{ option.text }}</option>"#,
    r#"{% endfor %}"#,
    r#"</select>"#,
);

const CONTROL_TEMPLATE: &str = r#"<div id="{{ container_id }}">{{ body | safe }}</div>"#;

// Every template here emits HTML, including ones rendered from plain strings.
static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
});

/// Renders the stylesheet `<link>` element.
pub fn render_link(link: &StylesheetLink) -> Result<String, Error> {
    ENV.render_str(LINK_TEMPLATE, context! { id => &link.id, href => &link.href })
}

/// Renders the label and select that go inside the switcher container.
///
/// `selected` marks the matching option with the `selected` attribute.
pub fn render_control_body(control: &ControlSpec, selected: Option<&str>) -> Result<String, Error> {
    ENV.render_str(
        CONTROL_BODY_TEMPLATE,
        context! {
            select_id => &control.select_id,
            label => &control.label,
            aria_label => &control.aria_label,
            options => &control.options,
            selected => selected,
        },
    )
}

/// Renders the complete switcher container.
pub fn render_control(control: &ControlSpec, selected: Option<&str>) -> Result<String, Error> {
    let body = render_control_body(control, selected)?;
    ENV.render_str(
        CONTROL_TEMPLATE,
        context! { container_id => &control.container_id, body => body },
    )
}
