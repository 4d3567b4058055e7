/// Remediation hints keyed by exact issue message.
///
/// Messages not listed here get `FALLBACK_SUGGESTION`.
const SUGGESTIONS: &[(&str, &str)] = &[
    // meta
    ("Missing page title", "Add a unique <title> of 30-60 characters describing the page."),
    (
        "Title too short",
        "Expand the title to 30-60 characters with the primary keyword near the start.",
    ),
    (
        "Title too long",
        "Shorten the title to 60 characters or fewer so it is not truncated in results.",
    ),
    ("Multiple title tags", "Keep a single <title> element in the document head."),
    (
        "Missing meta description",
        "Add a meta description of 120-160 characters summarizing the page.",
    ),
    ("Meta description too short", "Expand the meta description to 120-160 characters."),
    ("Meta description too long", "Trim the meta description to 160 characters or fewer."),
    (
        "Missing charset declaration",
        "Declare <meta charset=\"utf-8\"> as the first element in <head>.",
    ),
    (
        "Meta keywords tag is ignored by search engines",
        "Remove the meta keywords tag; search engines ignore it.",
    ),
    // heading
    ("Missing H1 heading", "Add exactly one <h1> that states the main topic of the page."),
    ("Multiple H1 headings", "Use a single <h1> and demote the others to <h2> or lower."),
    ("Skipped heading level", "Nest headings sequentially (h1, h2, h3) without skipping levels."),
    ("Empty heading", "Give every heading meaningful text or remove it."),
    ("No H2 subheadings", "Break the content into sections with <h2> subheadings."),
    // image
    (
        "Images missing alt attribute",
        "Add alt text describing each informative image; use alt=\"\" only for decorative images.",
    ),
    (
        "Images missing dimensions",
        "Set width and height attributes to reserve space and avoid layout shift.",
    ),
    ("Images not lazy loaded", "Add loading=\"lazy\" to below-the-fold images."),
    (
        "Images with empty alt text",
        "Confirm these images are decorative; otherwise describe them in alt text.",
    ),
    // link
    (
        "Links with non-descriptive text",
        "Replace generic text like \"click here\" with text that describes the destination.",
    ),
    ("Empty links", "Give each link visible text or an aria-label."),
    (
        "Unsafe target=_blank links",
        "Add rel=\"noopener noreferrer\" to links that open in a new tab.",
    ),
    ("JavaScript pseudo-links", "Use <button> for actions and real URLs for navigation."),
    ("No internal links", "Link to related pages on the same site to help crawlers and readers."),
    // social
    ("Missing Open Graph title", "Add <meta property=\"og:title\"> for link previews."),
    ("Missing Open Graph description", "Add <meta property=\"og:description\"> for link previews."),
    (
        "Missing Open Graph image",
        "Add <meta property=\"og:image\"> with an image of at least 1200x630.",
    ),
    ("Missing Twitter card", "Add <meta name=\"twitter:card\" content=\"summary_large_image\">."),
    ("Missing Open Graph URL", "Add <meta property=\"og:url\"> with the canonical URL."),
    (
        "Missing Open Graph type",
        "Add <meta property=\"og:type\">, e.g. \"article\" or \"website\".",
    ),
    ("Open Graph image should be an absolute URL", "Use a full https:// URL for og:image."),
    // content
    ("Thin content", "Expand the main content to at least 300 words of substantive text."),
    ("Long paragraphs", "Break paragraphs longer than 150 words into shorter ones."),
    ("Long sentences", "Aim for an average sentence length under 25 words."),
    ("Low text-to-HTML ratio", "Reduce markup bloat or add more visible text content."),
    // semantic
    ("Missing main landmark", "Wrap the primary content in a <main> element."),
    ("Missing navigation landmark", "Wrap primary navigation links in a <nav> element."),
    (
        "Low semantic element usage",
        "Replace generic <div> containers with <header>, <section>, <article>, <aside> \
         and <footer> where appropriate.",
    ),
    ("Multiple main landmarks", "Keep a single visible <main> element per page."),
    ("Missing header or footer", "Wrap site header and footer content in <header> and <footer>."),
    // accessibility
    ("Missing document language", "Set the lang attribute on <html>, e.g. <html lang=\"en\">."),
    ("Form inputs without labels", "Associate each input with a <label for> or aria-label."),
    ("Buttons without accessible names", "Give each button visible text or an aria-label."),
    ("Positive tabindex values", "Remove positive tabindex values and rely on document order."),
    (
        "Focusable elements hidden from assistive technology",
        "Do not put aria-hidden=\"true\" on focusable elements.",
    ),
    ("Missing skip link", "Add a \"Skip to content\" link as the first focusable element."),
    // schema
    (
        "No structured data found",
        "Add JSON-LD structured data describing the page (e.g. Article, Product, Organization).",
    ),
    ("Invalid JSON-LD", "Fix the JSON syntax in application/ld+json scripts."),
    ("Structured data missing @type", "Give each JSON-LD object a schema.org @type."),
    // technical
    ("Missing canonical URL", "Add <link rel=\"canonical\"> pointing to the preferred URL."),
    ("Multiple canonical URLs", "Keep a single canonical link per page."),
    (
        "Page blocked from indexing",
        "Remove noindex from the robots meta tag if the page should rank.",
    ),
    ("Page not served over HTTPS", "Serve the page over HTTPS and redirect HTTP requests."),
    ("Missing doctype", "Start the document with <!DOCTYPE html> to avoid quirks mode."),
    ("Missing favicon", "Add <link rel=\"icon\"> so browsers and results show the site icon."),
    // performance
    ("Slow server response", "Reduce server response time below 800ms with caching or a CDN."),
    ("Large page size", "Reduce the HTML payload below 500KB."),
    ("Too many scripts", "Bundle or defer scripts; keep external scripts under 15."),
    ("Too many stylesheets", "Combine stylesheets to cut render-blocking requests."),
    ("Render-blocking scripts in head", "Add defer or async to scripts in <head>."),
    ("Excessive DOM size", "Keep the DOM under 1500 elements by simplifying markup."),
    // geo
    (
        "No question-style headings",
        "Phrase some headings as questions that AI assistants can match to queries.",
    ),
    ("No FAQ content", "Add an FAQ section answering common questions directly."),
    (
        "No extractable lists or tables",
        "Present key facts as lists or tables so they can be quoted.",
    ),
    (
        "No statistics or data points",
        "Include concrete numbers, percentages or dates to support claims.",
    ),
    ("Missing author information", "Identify the author with a byline or author metadata."),
    ("Missing publish date", "Show a publish or last-updated date, e.g. with <time datetime>."),
    ("No outbound citations", "Cite authoritative external sources for key claims."),
    // mobile
    (
        "Missing viewport meta tag",
        "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">.",
    ),
    ("Viewport disables zoom", "Remove user-scalable=no and maximum-scale=1 so users can zoom."),
    ("Viewport missing device-width", "Set width=device-width in the viewport meta tag."),
    ("Fixed-width elements", "Replace fixed pixel widths with responsive units."),
    ("Small font sizes", "Use a base font size of at least 12px for body text."),
    ("Missing touch icon", "Add <link rel=\"apple-touch-icon\"> for home screen shortcuts."),
];

pub const FALLBACK_SUGGESTION: &str =
    "Review this item against current SEO and accessibility best practices.";

/// Look up the remediation hint for an issue message.
pub fn suggestion_for(message: &str) -> &'static str {
    SUGGESTIONS
        .iter()
        .find(|(key, _)| *key == message)
        .map(|(_, suggestion)| *suggestion)
        .unwrap_or(FALLBACK_SUGGESTION)
}
