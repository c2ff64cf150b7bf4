//! Server-rendered landing page with the embedded chat widget
//!
//! The page is plain HTML. Styling and the widget script are static files
//! under `assets/`, served by [`crate::assets`]; the script talks to the
//! widget API under `/v1/widgets` and never interprets answers itself.

use crate::config::SiteConfig;

/// Render the landing page for the given copy
pub fn render(site: &SiteConfig) -> String {
    let features: String = site
        .features
        .iter()
        .map(|feature| {
            format!(
                r#"
    <div class="feature">
      <h3>{}</h3>
      <p>{}</p>
    </div>"#,
                escape_html(&feature.name),
                escape_html(&feature.description),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} {highlight}</title>
<link rel="stylesheet" href="/assets/advisor.css">
<script src="/assets/advisor.js" defer></script>
</head>
<body>

<section class="hero">
  <h1><span>{title}</span><span class="accent">{highlight}</span></h1>
  <p class="tagline">{tagline}</p>
  <button id="start-chat" class="cta" type="button">{cta}</button>
</section>

<section class="features">
  <h2>{heading}</h2>
  <p class="intro">{intro}</p>
  <div class="grid">{features}
  </div>
</section>

<div id="chat" class="chat" hidden>
  <header>
    <h3>{widget_title}</h3>
    <button id="close-chat" type="button" aria-label="Close">&times;</button>
  </header>
  <ol id="messages" class="messages"></ol>
  <form id="chat-form" class="composer">
    <input id="chat-input" type="text" autocomplete="off" placeholder="{placeholder}">
    <button id="chat-send" type="submit">Send</button>
  </form>
</div>

</body>
</html>
"#,
        title = escape_html(&site.hero.title),
        highlight = escape_html(&site.hero.highlight),
        tagline = escape_html(&site.hero.tagline),
        cta = escape_html(&site.hero.call_to_action),
        heading = escape_html(&site.showcase.heading),
        intro = escape_html(&site.showcase.intro),
        widget_title = escape_html(&site.widget.title),
        placeholder = escape_html(&site.widget.placeholder),
    )
}

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
