//! HTML rendering for the browse page and episode card fragments.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::assets::{SCRIPT, STYLE};
use crate::model::{Episode, SearchPage};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("valid tag regex"));

const SKELETON_CARDS: usize = 6;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn html_attr(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

/// Drop markup such as search-highlight spans, keeping the text.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Whole minutes, rounded down.
pub fn format_duration(seconds: u64) -> String {
    format!("{} min", seconds / 60)
}

/// `Mar 5, 2024` in UTC; empty when the timestamp is out of range.
pub fn format_date(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

pub fn render_card(ep: &Episode) -> String {
    let image = if ep.thumbnail.is_empty() {
        &ep.image
    } else {
        &ep.thumbnail
    };
    let media = if image.is_empty() {
        String::from("<div class=\"card-media\"></div>")
    } else {
        format!(
            "<div class=\"card-media\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>",
            html_attr(image),
            html_attr(&ep.title_original)
        )
    };

    format!(
        r#"<article class="card" data-episode-id="{id}">
  {media}
  <div class="card-body">
    <div class="card-meta"><span>{date}</span><span>{duration}</span></div>
    <h3 class="card-title">{title}</h3>
    <p class="card-publisher">{publisher}</p>
    <p class="card-description">{description}</p>
  </div>
  <div class="card-footer">
    <button type="button" class="btn" data-summarize data-id="{id}" data-title="{title_attr}" data-publisher="{publisher_attr}">Summarize</button>
  </div>
</article>
"#,
        id = html_attr(&ep.id),
        media = media,
        date = html_escape(&format_date(ep.pub_date_ms)),
        duration = format_duration(ep.audio_length_sec),
        title = html_escape(&ep.title),
        publisher = html_escape(&ep.podcast.publisher),
        description = html_escape(&strip_tags(&ep.description_highlighted)),
        title_attr = html_attr(&ep.title),
        publisher_attr = html_attr(&ep.podcast.publisher),
    )
}

/// One page of cards. The root's `data-has-more` drives infinite scroll.
pub fn render_card_page(page: &SearchPage, page_no: u32, has_more: bool) -> String {
    let mut body = String::new();
    if page.results.is_empty() && page_no <= 1 {
        body.push_str(
            "<p class=\"empty\">No podcasts found. Try a different search term.</p>\n",
        );
    }
    for ep in &page.results {
        body.push_str(&render_card(ep));
    }
    format!(
        "<div class=\"card-page\" data-page=\"{}\" data-has-more=\"{}\">\n{}</div>\n",
        page_no, has_more, body
    )
}

pub fn render_error(message: &str) -> String {
    format!(
        "<div class=\"card-page\" data-has-more=\"false\"><p class=\"alert\">{}</p></div>\n",
        html_escape(message)
    )
}

fn render_card_skeletons(n: usize) -> String {
    let one = r#"<div class="card skeleton-card">
  <div class="skeleton h-48"></div>
  <div class="skeleton h-6 w-3-4"></div>
  <div class="skeleton h-4 w-1-2"></div>
  <div class="skeleton h-4"></div>
  <div class="skeleton h-4"></div>
  <div class="skeleton h-4 w-3-4"></div>
  <div class="skeleton h-10"></div>
</div>
"#;
    one.repeat(n)
}

fn render_summary_skeleton() -> String {
    let mut lines = String::from("<div class=\"skeleton h-8 w-3-4\"></div>\n");
    for _ in 0..4 {
        lines.push_str("<div class=\"skeleton h-4\"></div>\n");
    }
    lines.push_str("<div class=\"skeleton h-4 w-3-4\"></div>\n");
    lines
}

pub fn render_page(title: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{style}</style>
  </head>
  <body>
    <div id="toasts" class="toasts" aria-live="polite"></div>
    <main class="container">
      <h1>{title}</h1>
      <p class="subtitle">Discover podcasts and get AI-generated summaries</p>

      <form id="search" class="search" role="search">
        <input id="search-input" type="search" name="query" placeholder="Search episodes">
        <button type="submit" class="btn">Search</button>
      </form>

      <section id="summary" class="summary" hidden></section>

      <h2>Podcasts</h2>
      <div id="grid" class="grid">
{skeletons}      </div>
      <div id="sentinel" class="sentinel"><div class="spinner" hidden></div></div>
      <p id="end" class="end" hidden>You've seen all podcasts</p>
    </main>

    <template id="card-skeletons">{skeletons}</template>
    <template id="summary-skeleton">{summary_skeleton}</template>
    <script>{script}</script>
  </body>
</html>
"#,
        title = html_escape(title),
        style = STYLE,
        skeletons = render_card_skeletons(SKELETON_CARDS),
        summary_skeleton = render_summary_skeleton(),
        script = SCRIPT,
    )
}
