//! Shared page chrome and form widgets.
//!
//! Every page is assembled from `const` HTML fragments with `{{PLACEHOLDER}}`
//! substitution. All user-supplied text goes through [`escape_html`] before
//! it is spliced in.

use std::fmt::Write as _;

use axum::http::StatusCode;

use scaffy_core::notice::Notice;

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A bare HTML document: head, styles and `body`.
#[must_use]
pub fn document(title: &str, body: &str) -> String {
    document_with_head(title, "", body)
}

/// Like [`document`], with extra markup appended to `<head>`.
#[must_use]
pub fn document_with_head(title: &str, extra_head: &str, body: &str) -> String {
    let mut html = String::with_capacity(PAGE_HEAD.len() + extra_head.len() + body.len() + 64);
    html.push_str(&PAGE_HEAD.replace("{{TITLE}}", &escape_html(title)));
    html.push_str(extra_head);
    html.push_str("</head>\n<body>\n");
    html.push_str(body);
    html.push_str("\n</body></html>\n");
    html
}

/// Attribute that opts a `<form>` into [`SUBMIT_GUARD`].
pub const SUBMIT_ONCE: &str = "data-submit-once";

/// Drops repeat submits of a `data-submit-once` form while the first request
/// is in flight. Buttons are disabled after the event so the pressed
/// button's `name=value` still goes out. A page restored from the
/// back/forward cache is unlocked again.
pub const SUBMIT_GUARD: &str = r#"<script>
document.addEventListener("submit",function(e){var f=e.target;if(!f.hasAttribute("data-submit-once"))return;if(f.dataset.submitting){e.preventDefault();return}f.dataset.submitting="1";f.setAttribute("aria-busy","true");setTimeout(function(){f.querySelectorAll("button[type=submit]").forEach(function(b){b.disabled=true})},0)});
window.addEventListener("pageshow",function(e){if(!e.persisted)return;document.querySelectorAll("form[data-submit-once]").forEach(function(f){delete f.dataset.submitting;f.removeAttribute("aria-busy");f.querySelectorAll("button[type=submit]").forEach(function(b){b.disabled=false})})});
</script>"#;

/// A document with the site header and a centered content column.
#[must_use]
pub fn layout(brand: &str, title: &str, content: &str) -> String {
    let header = SITE_HEADER.replace("{{BRAND}}", &escape_html(brand));
    document(
        &format!("{title} | {brand}"),
        &format!("{header}<main class=\"page\">\n{content}\n</main>\n{SUBMIT_GUARD}"),
    )
}

/// Page heading block used by the quote and auth pages.
#[must_use]
pub fn heading(title: &str, kicker: &str, back_href: &str) -> String {
    format!(
        r#"<div class="page-heading"><a class="back" href="{back}" aria-label="Back">&larr;</a><div><h1>{title}</h1><p class="kicker">{kicker}</p></div></div>"#,
        back = escape_html(back_href),
        title = escape_html(title),
        kicker = escape_html(kicker),
    )
}

/// The notice list. Empty input renders nothing.
#[must_use]
pub fn notices(list: &[Notice]) -> String {
    if list.is_empty() {
        return String::new();
    }
    let mut out = String::from(r#"<div class="notices" role="status">"#);
    for notice in list {
        let _ = write!(
            out,
            r#"<div class="notice notice-{variant}"><strong>{title}</strong><p>{description}</p></div>"#,
            variant = notice.variant.as_str(),
            title = escape_html(&notice.title),
            description = escape_html(&notice.description),
        );
    }
    out.push_str("</div>");
    out
}

/// Static description of one form control.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'a str,
    pub label: &'a str,
    /// `text`, `tel`, `email`, `password`, `number`...
    pub kind: &'a str,
    pub placeholder: &'a str,
}

fn field_error(name: &str, error: Option<&str>) -> String {
    error.map_or_else(String::new, |msg| {
        format!(
            r#"<p class="field-error" id="{name}-error">{msg}</p>"#,
            msg = escape_html(msg)
        )
    })
}

fn invalid_attrs(name: &str, error: Option<&str>) -> String {
    if error.is_some() {
        format!(r#" aria-invalid="true" aria-describedby="{name}-error""#)
    } else {
        String::new()
    }
}

/// A labelled `<input>` with its inline error.
#[must_use]
pub fn input(field: Field<'_>, value: &str, error: Option<&str>) -> String {
    // Password values are never echoed back.
    let value = if field.kind == "password" { "" } else { value };
    let step = if field.kind == "number" {
        r#" step="any" min="0""#
    } else {
        ""
    };
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><input id="{name}" name="{name}" type="{kind}" placeholder="{placeholder}" value="{value}"{step}{invalid}/>{error}</div>"#,
        name = field.name,
        label = escape_html(field.label),
        kind = field.kind,
        placeholder = escape_html(field.placeholder),
        value = escape_html(value),
        invalid = invalid_attrs(field.name, error),
        error = field_error(field.name, error),
    )
}

/// A labelled `<textarea>` with its inline error.
#[must_use]
pub fn textarea(field: Field<'_>, value: &str, error: Option<&str>) -> String {
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><textarea id="{name}" name="{name}" placeholder="{placeholder}"{invalid}>{value}</textarea>{error}</div>"#,
        name = field.name,
        label = escape_html(field.label),
        placeholder = escape_html(field.placeholder),
        value = escape_html(value),
        invalid = invalid_attrs(field.name, error),
        error = field_error(field.name, error),
    )
}

/// A radio group rendered as a grid of toggle buttons.
///
/// `options` are `(value, label)` pairs.
#[must_use]
pub fn choices(
    name: &str,
    label: &str,
    options: &[(&str, &str)],
    selected: &str,
    error: Option<&str>,
) -> String {
    let mut out = format!(
        r#"<fieldset class="field choices"{invalid}><legend>{label}</legend><div class="choice-grid">"#,
        invalid = invalid_attrs(name, error),
        label = escape_html(label),
    );
    for (value, text) in options {
        let checked = if *value == selected { " checked" } else { "" };
        let _ = write!(
            out,
            r#"<label class="choice"><input type="radio" name="{name}" value="{value}"{checked}/><span>{text}</span></label>"#,
            value = escape_html(value),
            text = escape_html(text),
        );
    }
    out.push_str("</div>");
    out.push_str(&field_error(name, error));
    out.push_str("</fieldset>");
    out
}

/// A hidden input.
#[must_use]
pub fn hidden(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{name}" value="{value}"/>"#,
        value = escape_html(value)
    )
}

/// The "Page Error" card with "Go Back" and "Home" actions.
#[must_use]
pub fn error_page(status: StatusCode, heading: &str, message: &str) -> String {
    let body = ERROR_BODY
        .replace("{{STATUS}}", status.as_str())
        .replace("{{HEADING}}", &escape_html(heading))
        .replace("{{MESSAGE}}", &escape_html(message));
    document(heading, &body)
}

/// `<head>` and styles shared by every page.
const PAGE_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{{TITLE}}</title>
<style>
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
:root{--bg:#141414;--card:#1E1E1E;--border:#2E2E2E;--text:#F2F2F2;--muted:#9AA3A8;--gold:#F5C842;--gold-light:#F5E6B8;--steel:#5B6B73;--danger:#E5484D;--font:-apple-system,'Segoe UI',Roboto,sans-serif}
body{font-family:var(--font);background:var(--bg);color:var(--text);line-height:1.6;-webkit-font-smoothing:antialiased;min-height:100vh}
a{color:inherit;text-decoration:none}
.site-header{position:sticky;top:0;z-index:50;background:rgba(20,20,20,.85);backdrop-filter:blur(6px);border-bottom:1px solid var(--border)}
.site-header a{display:block;max-width:1100px;margin:0 auto;padding:16px 24px;font-weight:800;letter-spacing:-.3px;color:var(--gold)}
.page{max-width:720px;margin:0 auto;padding:32px 24px 120px}
.page-heading{display:flex;align-items:center;gap:16px;margin-bottom:32px}
.page-heading h1{font-size:28px;font-weight:800;color:var(--gold)}
.kicker{font-size:12px;text-transform:uppercase;letter-spacing:2px;color:var(--muted);font-weight:700}
.back{display:flex;align-items:center;justify-content:center;width:44px;height:44px;border-radius:14px;background:var(--card);border:1px solid var(--border)}
.mode{display:inline-block;margin-bottom:24px;padding:6px 14px;border-radius:50px;background:rgba(245,200,66,.1);color:var(--gold);font-weight:700;font-size:13px}
.btn{display:inline-flex;align-items:center;justify-content:center;gap:6px;padding:14px 28px;border-radius:14px;font-size:15px;font-weight:800;font-family:var(--font);border:none;cursor:pointer;transition:all .2s;letter-spacing:.3px}
.btn-primary{background:linear-gradient(135deg,#F5C842,#E8A817);color:#141414}
.btn-secondary{background:var(--card);color:var(--text);border:1px solid var(--border)}
.btn-block{width:100%}
.btn[disabled]{opacity:.5;cursor:not-allowed}
.field{margin-bottom:20px;border:none}
.field label,.field legend{display:block;font-size:12px;font-weight:700;color:var(--muted);text-transform:uppercase;letter-spacing:1.5px;margin-bottom:10px}
.field input,.field textarea{width:100%;height:52px;padding:0 16px;border-radius:12px;background:var(--card);border:1px solid var(--border);color:var(--text);font:inherit}
.field textarea{height:auto;min-height:128px;padding:14px 16px;resize:vertical}
.field [aria-invalid=true]{border-color:var(--danger)}
.field-error{margin-top:6px;font-size:13px;color:var(--danger)}
.choice-grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(120px,1fr));gap:10px}
.choice input{position:absolute;opacity:0}
.choice span{display:flex;align-items:center;justify-content:center;height:48px;border-radius:12px;background:var(--card);border:1px solid var(--border);color:var(--muted);font-weight:700;cursor:pointer}
.choice input:checked+span{background:var(--steel);color:var(--text);border-color:var(--steel)}
.notices{display:flex;flex-direction:column;gap:10px;margin-bottom:24px}
.notice{padding:14px 18px;border-radius:12px;background:var(--card);border:1px solid var(--border)}
.notice p{font-size:14px;color:var(--muted)}
.notice-destructive{border-color:var(--danger);background:rgba(229,72,77,.12)}
.notice-destructive strong{color:var(--danger)}
.card{background:var(--card);border:1px solid var(--border);border-radius:18px;padding:22px;margin-bottom:14px}
.card h3{font-size:18px;font-weight:800}
.card p{font-size:14px;color:var(--muted)}
.submit-bar{position:fixed;bottom:0;left:0;right:0;padding:16px;background:rgba(20,20,20,.9);border-top:1px solid var(--border)}
.submit-bar .btn{display:flex;max-width:672px;margin:0 auto;width:100%}
.error-card{max-width:440px;margin:15vh auto 0;padding:32px;text-align:center;background:var(--card);border:1px solid var(--border);border-radius:20px}
.error-card h1{font-size:24px;font-weight:800;margin-bottom:8px}
.error-card p{color:var(--muted);margin-bottom:24px}
.error-card .status{font-size:13px;color:var(--danger);font-weight:700;letter-spacing:2px}
.error-actions{display:flex;gap:12px;justify-content:center;flex-wrap:wrap}
</style>
"##;

const SITE_HEADER: &str = r#"<header class="site-header"><a href="/">{{BRAND}}</a></header>
"#;

const ERROR_BODY: &str = r#"<div class="error-card" role="alert">
  <p class="status">{{STATUS}}</p>
  <h1>{{HEADING}}</h1>
  <p>{{MESSAGE}}</p>
  <div class="error-actions">
    <button type="button" class="btn btn-primary" onclick="history.back()">&larr; Go Back</button>
    <a class="btn btn-secondary" href="/">Home</a>
  </div>
</div>"#;
