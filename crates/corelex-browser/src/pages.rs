//! Server-side HTML for the browser pages.
//!
//! Pages are assembled from the templates under `templates/`. Every value
//! that comes from the tables or the request is escaped before it is placed.

use corelex_listing::{DisplayRow, NounGroup};
use corelex_types::{BasicType, display_noun};

use crate::search::{MAX_QUERY_LEN, SearchOutcome};

pub const WORDNET_URL: &str = "http://wordnetweb.princeton.edu/perl/webwn";

const BASE_HTML: &str = include_str!("../templates/base.html");
const STYLE_HTML: &str = include_str!("../templates/style.html");
const HEADER_HTML: &str = include_str!("../templates/header.html");
const FOOTER_HTML: &str = include_str!("../templates/footer.html");
const HOME_BODY_HTML: &str = include_str!("../templates/home_body.html");
const SEARCH_FORM_HTML: &str = include_str!("../templates/search_form.html");

const TABLE_OPEN: &str = r#"<table class="indent">"#;

/// What the search page shows below the form.
#[derive(Debug)]
pub enum SearchView<'a> {
    Empty,
    Rejected { raw: &'a str },
    Outcome(&'a SearchOutcome<'a>),
}

/// Substitute `{{key}}` placeholders in one pass; inserted values are not
/// scanned again.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn render_page(title: &str, body: &str) -> String {
    let title = html_escape(title);
    let header = fill(HEADER_HTML, &[("title", title.as_str())]);
    fill(
        BASE_HTML,
        &[
            ("title", title.as_str()),
            ("style", STYLE_HTML),
            ("header", header.as_str()),
            ("body", body),
            ("footer", FOOTER_HTML),
        ],
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// WordNet web search link for a stored noun.
pub fn wordnet_url(noun: &str) -> String {
    format!(
        "{}?s={}",
        WORDNET_URL,
        urlencoding::encode(&display_noun(noun))
    )
}

fn type_href(corelex_type: &str, noun: Option<&str>) -> String {
    let mut href = format!("/type?id={}", urlencoding::encode(corelex_type));
    if let Some(noun) = noun {
        href.push_str("&noun=");
        href.push_str(&urlencoding::encode(noun));
    }
    html_escape(&href)
}

/// Escape, then keep the codes of a polysemous type on one line.
fn nowrap(text: &str) -> String {
    html_escape(text).replace(' ', "&nbsp;")
}

fn type_rows_table(rows: &[DisplayRow<'_>]) -> String {
    let mut html = String::new();
    html.push_str(TABLE_OPEN);
    html.push('\n');
    for row in rows {
        html.push_str("<tr>\n");
        match row.corelex_type {
            Some(label) => html.push_str(&format!(
                "  <td><a href=\"{}\">{}</a></td>\n",
                type_href(label, None),
                html_escape(label)
            )),
            None => html.push_str("  <td class=\"continuation\">&nbsp;</td>\n"),
        }
        html.push_str(&format!("  <td>{}</td>\n", nowrap(row.polysemous_type)));
        html.push_str(&format!("  <td>{}</td>\n", html_escape(&row.synsets)));
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

pub fn home_html() -> String {
    render_page("CoreLex Browser", HOME_BODY_HTML)
}

pub fn types_html(rows: &[DisplayRow<'_>]) -> String {
    render_page("CoreLex Types", &type_rows_table(rows))
}

pub fn type_html(
    corelex_type: &str,
    rows: &[DisplayRow<'_>],
    groups: &[NounGroup<'_>],
    highlight: Option<&str>,
) -> String {
    let mut body = type_rows_table(rows);
    body.push_str("<table class=\"nouns indent\">\n");
    for group in groups {
        body.push_str("<tr>\n");
        body.push_str(&format!("  <td>{}</td>\n", nowrap(group.polysemous_type)));
        body.push_str("  <td>");
        for noun in &group.nouns {
            let text = html_escape(&display_noun(noun));
            let text = if highlight == Some(*noun) {
                format!("<strong>{text}</strong>")
            } else {
                text
            };
            body.push_str(&format!(
                "<a href=\"{}\">{}</a> ",
                html_escape(&wordnet_url(noun)),
                text
            ));
        }
        body.push_str("</td>\n</tr>\n");
    }
    body.push_str("</table>\n");

    let title = format!("CoreLex Type {}", corelex_type.to_uppercase());
    render_page(&title, &body)
}

pub fn basic_types_html(basic_types: &[BasicType<'_>]) -> String {
    let mut body = String::new();
    body.push_str(TABLE_OPEN);
    body.push_str(
        "\n<tr class=\"heading\">\n  <td>basic type</td>\n  <td>synset</td>\n  <td>synset members</td>\n</tr>\n",
    );
    for bt in basic_types {
        body.push_str(&format!(
            "<tr>\n  <td>{}</td>\n  <td>{}</td>\n  <td>{}</td>\n</tr>\n",
            html_escape(bt.code),
            html_escape(bt.synset_id),
            html_escape(bt.synset_elements)
        ));
    }
    body.push_str("</table>\n");
    render_page("Basic Types", &body)
}

pub fn search_html(view: &SearchView<'_>) -> String {
    let previous = match view {
        SearchView::Empty => String::new(),
        SearchView::Rejected { raw } => html_escape(raw),
        SearchView::Outcome(outcome) => html_escape(&display_noun(&outcome.noun)),
    };
    let max_len = MAX_QUERY_LEN.to_string();
    let mut body = fill(
        SEARCH_FORM_HTML,
        &[("noun", previous.as_str()), ("max_len", max_len.as_str())],
    );

    match view {
        SearchView::Empty => {}
        SearchView::Rejected { raw } => body.push_str(&format!(
            "<p class=\"warning\">WARNING: search term '{}' is not allowed.</p>\n",
            html_escape(raw)
        )),
        SearchView::Outcome(outcome) if outcome.matches.is_empty() => body.push_str(&format!(
            "<p>Did not find <b>{}</b> in CoreLex</p>\n",
            html_escape(&display_noun(&outcome.noun))
        )),
        SearchView::Outcome(outcome) => body.push_str(&search_results(outcome)),
    }

    render_page("Search CoreLex", &body)
}

fn search_results(outcome: &SearchOutcome<'_>) -> String {
    let mut html = format!("<p><b>{}</b>", html_escape(&display_noun(&outcome.noun)));
    if let Some(lemma) = outcome.lemma.as_deref().filter(|l| *l != outcome.noun) {
        html.push_str(&format!(
            " (found as <b>{}</b>)",
            html_escape(&display_noun(lemma))
        ));
    }
    html.push_str("</p>\n");

    html.push_str(TABLE_OPEN);
    html.push_str(
        "\n<tr class=\"heading\">\n  <td>CoreLex Type</td>\n  <td>Polysemous Type</td>\n  <td>WordNet Entry</td>\n</tr>\n",
    );
    for noun in &outcome.matches {
        let wn = wordnet_url(noun.noun);
        html.push_str(&format!(
            "<tr>\n  <td><a href=\"{}\">{}</a></td>\n  <td>{}</td>\n  <td><a href=\"{wn}\">{wn}</a></td>\n</tr>\n",
            type_href(noun.corelex_type, Some(noun.noun)),
            html_escape(noun.corelex_type),
            html_escape(noun.polysemous_type),
            wn = html_escape(&wn),
        ));
    }
    html.push_str("</table>\n");
    html
}

/// Error page; `message` is shown as is after escaping.
pub fn error_html(title: &str, message: &str) -> String {
    render_page(
        title,
        &format!("<p class=\"error\">{}</p>\n", html_escape(message)),
    )
}
