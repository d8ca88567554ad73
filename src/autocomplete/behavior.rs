//! Autocomplete behavior attached to one text field.
//!
//! # Responsibilities
//! - Reference the shared `wicket-autocomplete.js` from the page head
//! - Emit the script that binds the field to its callback URL
//! - Answer the callback with the suggestion list
//!
//! # Design Decisions
//! - URLs are built from the filter path at render time, so rendering
//!   never forces the mount to resolve early
//! - Suggestion lists are never cached by the client

use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use crate::autocomplete::source::AutoCompleteSource;
use crate::autocomplete::{SCRIPT_NAME, SCRIPT_SCOPE};
use crate::filter::path::FilterPath;
use crate::http::request::WebRequest;
use crate::http::response::WebResponse;

/// Query parameter carrying the text typed so far.
pub const INPUT_PARAMETER: &str = "q";

const SCRIPT_OPEN_TAG: &str = "<script type=\"text/javascript\"><!--/*--><![CDATA[/*><!--*/\n";
const SCRIPT_CLOSE_TAG: &str = "\n/*-->]]>*/</script>";

pub struct AutoCompleteBehavior {
    markup_id: String,
    source: Arc<dyn AutoCompleteSource>,
}

impl AutoCompleteBehavior {
    pub fn new(markup_id: impl Into<String>, source: impl AutoCompleteSource + 'static) -> Self {
        Self {
            markup_id: markup_id.into(),
            source: Arc::new(source),
        }
    }

    pub fn markup_id(&self) -> &str {
        &self.markup_id
    }

    /// `/ctx/<filter>/wicket/autocomplete/<markup-id>`
    pub fn callback_url(&self, filter: &FilterPath) -> String {
        filter.url_for(&format!("wicket/autocomplete/{}", self.markup_id))
    }

    /// `<script>` reference to the shared script, for the page head.
    pub fn render_head(&self, filter: &FilterPath) -> String {
        let src = filter.url_for(&format!("wicket/resource/{}/{}", SCRIPT_SCOPE, SCRIPT_NAME));
        format!("<script type=\"text/javascript\" src=\"{}\"></script>", escape_html(&src))
    }

    /// Script emitted right after the component's markup.
    pub fn render_init_script(&self, filter: &FilterPath) -> String {
        format!(
            "{}new WicketAutoComplete('{}','{}');{}",
            SCRIPT_OPEN_TAG,
            escape_js(&self.markup_id),
            escape_js(&self.callback_url(filter)),
            SCRIPT_CLOSE_TAG
        )
    }

    /// Suggestions for `input` as `<ul><li textvalue="…">…</li></ul>`.
    pub fn render_choices(&self, input: &str) -> String {
        let mut markup = String::from("<ul>");
        for choice in self.source.choices(input) {
            let escaped = escape_html(&choice);
            let _ = write!(markup, "<li textvalue=\"{}\">{}</li>", escaped, escaped);
        }
        markup.push_str("</ul>");
        markup
    }

    /// Answer the callback request. A missing `q` counts as empty input.
    pub fn respond(&self, request: &WebRequest, response: &mut dyn WebResponse) -> io::Result<()> {
        let input = request.query_parameter(INPUT_PARAMETER).unwrap_or_default();
        tracing::debug!(component = %self.markup_id, input = %input, "Autocomplete request");

        let markup = self.render_choices(&input);
        response.set_content_type("text/xml; charset=utf-8");
        response.disable_caching(request.timestamp());
        response.set_content_length(markup.len() as u64);
        response.write(markup.as_bytes())
    }
}

impl std::fmt::Debug for AutoCompleteBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCompleteBehavior")
            .field("markup_id", &self.markup_id)
            .finish_non_exhaustive()
    }
}

/// Escape text for HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escape text for a single-quoted JavaScript string.
fn escape_js(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '<' => escaped.push_str("\\x3C"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::source::StaticChoices;
    use crate::http::response::BufferedResponse;
    use axum::http::header;

    fn behavior() -> AutoCompleteBehavior {
        AutoCompleteBehavior::new(
            "country",
            StaticChoices::new(vec!["Norway".into(), "Nepal".into(), "Tom & Jerry's <Land>".into()], 10),
        )
    }

    fn mounted() -> FilterPath {
        let filter = FilterPath::new("/shop");
        filter.set_filter_path("app/").unwrap();
        filter
    }

    #[test]
    fn test_init_script() {
        assert_eq!(
            behavior().render_init_script(&mounted()),
            "<script type=\"text/javascript\"><!--/*--><![CDATA[/*><!--*/\n\
             new WicketAutoComplete('country','/shop/app/wicket/autocomplete/country');\n\
             /*-->]]>*/</script>"
        );
    }

    #[test]
    fn test_head_contribution() {
        assert_eq!(
            behavior().render_head(&mounted()),
            "<script type=\"text/javascript\" \
             src=\"/shop/app/wicket/resource/autocomplete/wicket-autocomplete.js\"></script>"
        );
    }

    #[test]
    fn test_choices_are_escaped() {
        assert_eq!(
            behavior().render_choices("tom"),
            "<ul><li textvalue=\"Tom &amp; Jerry&#39;s &lt;Land&gt;\">Tom &amp; Jerry&#39;s &lt;Land&gt;</li></ul>"
        );
    }

    #[test]
    fn test_respond() {
        let request = WebRequest::get("/shop/app/wicket/autocomplete/country?q=n");
        let mut response = BufferedResponse::new();
        behavior().respond(&request, &mut response).unwrap();

        let expected = "<ul><li textvalue=\"Norway\">Norway</li><li textvalue=\"Nepal\">Nepal</li></ul>";
        assert_eq!(response.body(), expected.as_bytes());
        assert_eq!(response.header(header::CONTENT_TYPE), Some("text/xml; charset=utf-8"));
        assert_eq!(response.header(header::CACHE_CONTROL), Some("no-cache, no-store"));
    }

    #[test]
    fn test_missing_query_is_empty_input() {
        let request = WebRequest::get("/wicket/autocomplete/country");
        let mut response = BufferedResponse::new();
        behavior().respond(&request, &mut response).unwrap();
        assert_eq!(response.body(), b"<ul></ul>");
    }
}
