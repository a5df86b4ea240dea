//! HTML output for segments and pages.

use std::collections::HashMap;

use url::Url;

use super::segments::*;
use crate::i18n::t;
use crate::models::{Language, SegmentId};
use crate::utils::{html_escape, is_safe_url};

/// Pre-resolved alt text by image URL.
pub type AltTexts = HashMap<String, String>;

/// Render one segment as a `<section>` fragment.
pub fn render_segment(
    id: SegmentId,
    body: &SegmentBody,
    alts: &AltTexts,
    language: Language,
) -> String {
    let inner = match body {
        SegmentBody::FullHero(d) => hero(d, alts, language),
        SegmentBody::Banner(d) => banner(d, alts),
        SegmentBody::Text(d) => text(d),
        SegmentBody::ImageText(d) => image_text(d, alts),
        SegmentBody::Faq(d) => faq(d, language),
        SegmentBody::Table(d) => table(d),
        SegmentBody::Video(d) => video(d, language),
        SegmentBody::Specification(d) => specification(d, alts, language),
        SegmentBody::NewsList(d) => news_list(d, alts, language),
        SegmentBody::Debug(v) => format!(
            r#"<pre class="segment-debug">{}</pre>"#,
            html_escape(&serde_json::to_string_pretty(v).unwrap_or_default())
        ),
    };

    format!(
        r#"<section class="segment segment-{kind}" id="segment-{id}">{inner}</section>"#,
        kind = body.kind(),
    )
}

fn heading(tag: &str, text: Option<&String>) -> String {
    match text.filter(|t| !t.trim().is_empty()) {
        Some(t) => format!("<{tag}>{}</{tag}>", html_escape(t)),
        None => String::new(),
    }
}

fn paragraphs(text: Option<&String>) -> String {
    text.map(|t| {
        t.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| format!("<p>{}</p>", html_escape(p).replace('\n', "<br>")))
            .collect::<String>()
    })
    .unwrap_or_default()
}

fn image(url: Option<&String>, alts: &AltTexts) -> String {
    match url.filter(|u| is_safe_url(u)) {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            html_escape(url),
            html_escape(alts.get(url.as_str()).map(String::as_str).unwrap_or(""))
        ),
        None => String::new(),
    }
}

fn link(href: Option<&String>, label: &str, class: &str) -> String {
    match href.filter(|h| is_safe_url(h)) {
        Some(href) => format!(
            r#"<a class="{class}" href="{}">{}</a>"#,
            html_escape(href),
            html_escape(label)
        ),
        None => String::new(),
    }
}

fn hero(d: &HeroData, alts: &AltTexts, language: Language) -> String {
    let cta_label = d
        .cta_text
        .clone()
        .unwrap_or_else(|| t(language, "hero.learn_more"));
    format!(
        r#"{}<div class="hero-content">{}{}{}{}</div>"#,
        image(d.image_url.as_ref(), alts),
        heading("h1", d.title.as_ref()),
        heading("h2", d.subtitle.as_ref()),
        paragraphs(d.description.as_ref()),
        link(d.cta_link.as_ref(), &cta_label, "cta"),
    )
}

fn banner(d: &BannerData, alts: &AltTexts) -> String {
    let label = d.link_text.as_deref().unwrap_or_default();
    format!(
        r#"{}<div class="banner-content">{}{}{}</div>"#,
        image(d.image_url.as_ref(), alts),
        heading("h2", d.title.as_ref()),
        heading("p", d.subtitle.as_ref()),
        if label.is_empty() {
            String::new()
        } else {
            link(d.link_url.as_ref(), label, "banner-link")
        },
    )
}

fn text(d: &TextData) -> String {
    format!(
        "{}{}",
        heading("h2", d.title.as_ref()),
        paragraphs(d.body.as_ref())
    )
}

fn image_text(d: &ImageTextData, alts: &AltTexts) -> String {
    let position = match d.image_position.as_deref() {
        Some("left") => "left",
        _ => "right",
    };
    format!(
        r#"<div class="image-text image-{position}"><div class="image-text-body">{}{}</div>{}</div>"#,
        heading("h2", d.title.as_ref()),
        paragraphs(d.body.as_ref()),
        image(d.image_url.as_ref(), alts),
    )
}

fn faq(d: &FaqData, language: Language) -> String {
    let title = d.title.clone().unwrap_or_else(|| t(language, "faq.title"));
    let items: String = d
        .items
        .iter()
        .map(|item| {
            format!(
                "<details><summary>{}</summary>{}</details>",
                html_escape(&item.question),
                paragraphs(Some(&item.answer))
            )
        })
        .collect();
    format!("<h2>{}</h2>{items}", html_escape(&title))
}

fn table(d: &TableData) -> String {
    let head: String = d
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", html_escape(h)))
        .collect();
    let rows: String = d
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(c)))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!(
        "{}<table><thead><tr>{head}</tr></thead><tbody>{rows}</tbody></table>",
        heading("h2", d.title.as_ref())
    )
}

/// Embed URL for known video hosts.
fn embed_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.");
    match host {
        "youtube.com" | "m.youtube.com" => {
            let id = parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())?;
            Some(format!("https://www.youtube.com/embed/{}", urlencoding::encode(&id)))
        }
        "youtu.be" => {
            let id = parsed.path_segments()?.next().filter(|s| !s.is_empty())?;
            Some(format!("https://www.youtube.com/embed/{id}"))
        }
        "vimeo.com" => {
            let id = parsed.path_segments()?.next().filter(|s| !s.is_empty())?;
            Some(format!("https://player.vimeo.com/video/{id}"))
        }
        _ => None,
    }
}

fn video(d: &VideoData, language: Language) -> String {
    if !is_safe_url(&d.video_url) {
        return heading("h2", d.title.as_ref());
    }
    let player = match embed_url(&d.video_url) {
        Some(embed) => format!(
            r#"<iframe src="{}" allowfullscreen loading="lazy"></iframe>"#,
            html_escape(&embed)
        ),
        None => format!(
            r#"<video controls preload="metadata" src="{}">{}</video>"#,
            html_escape(&d.video_url),
            html_escape(&t(language, "video.unsupported"))
        ),
    };
    format!(
        "{}{player}{}",
        heading("h2", d.title.as_ref()),
        heading("figcaption", d.caption.as_ref())
    )
}

fn specification(d: &SpecificationData, alts: &AltTexts, language: Language) -> String {
    let title = d
        .title
        .clone()
        .unwrap_or_else(|| t(language, "specification.title"));
    let items: String = d
        .items
        .iter()
        .map(|i| {
            format!(
                "<dt>{}</dt><dd>{}</dd>",
                html_escape(&i.label),
                html_escape(&i.value)
            )
        })
        .collect();
    format!(
        "<h2>{}</h2>{}{}<dl>{items}</dl>",
        html_escape(&title),
        heading("h3", d.product_name.as_ref()),
        image(d.image_url.as_ref(), alts),
    )
}

fn news_list(d: &NewsListData, alts: &AltTexts, language: Language) -> String {
    let read_more = t(language, "news.read_more");
    let items: String = d
        .items
        .iter()
        .map(|item| {
            format!(
                r#"<article class="news-item">{}<h3>{}</h3>{}{}{}</article>"#,
                image(item.image_url.as_ref(), alts),
                html_escape(&item.title),
                item.date
                    .as_ref()
                    .map(|d| format!("<time>{}</time>", html_escape(d)))
                    .unwrap_or_default(),
                paragraphs(item.summary.as_ref()),
                link(item.link.as_ref(), &read_more, "read-more"),
            )
        })
        .collect();
    format!("{}{items}", heading("h2", d.title.as_ref()))
}

/// Inputs for a full HTML page.
pub struct PageDocument<'a> {
    pub page_slug: &'a str,
    pub title: &'a str,
    pub language: Language,
    pub head_html: &'a str,
    pub body_html: &'a str,
}

/// Render a complete HTML document around rendered segments.
pub fn render_document(doc: &PageDocument<'_>) -> String {
    let lang = doc.language;
    let nav: String = [
        ("home", "nav.home"),
        ("products", "nav.products"),
        ("news", "nav.news"),
        ("contact", "nav.contact"),
    ]
    .iter()
    .map(|(slug, key)| {
        format!(
            r#"<a href="/pages/{slug}?lang={lang}">{}</a>"#,
            html_escape(&t(lang, key))
        )
    })
    .collect();
    let switcher: String = Language::ALL
        .iter()
        .map(|l| {
            let class = if *l == lang { r#" class="active""# } else { "" };
            format!(
                r#"<a{class} href="/pages/{}?lang={l}">{l}</a>"#,
                html_escape(doc.page_slug)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
{head}
</head>
<body>
<header><nav>{nav}</nav><div class="languages" aria-label="{language_label}">{switcher}</div></header>
<main>
{body}
</main>
<footer><p>{rights}</p></footer>
</body>
</html>
"#,
        title = html_escape(doc.title),
        head = doc.head_html,
        language_label = html_escape(&t(lang, "language.label")),
        body = doc.body_html,
        rights = html_escape(&t(lang, "footer.rights")),
    )
}

/// Body shown when a page cannot be assembled.
pub fn fallback_body(language: Language) -> String {
    format!(
        r#"<section class="segment segment-fallback"><h1>{}</h1><p>{}</p>{}</section>"#,
        html_escape(&t(language, "page.fallback_title")),
        html_escape(&t(language, "page.fallback_message")),
        format!(
            r#"<a class="cta" href="/pages/contact?lang={language}">{}</a>"#,
            html_escape(&t(language, "nav.contact"))
        ),
    )
}
