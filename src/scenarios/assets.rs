//! Static asset references in an HTML page
//!
//! Only quoted attribute values are recognised (`src="..."`, `href="..."`).
//! This is a scanner for one attribute at a time, not an HTML parser.

use url::Url;

/// Quoted values of `attr` ending in `suffix`, in document order
pub fn find_attr_values<'a>(html: &'a str, attr: &str, suffix: &str) -> Vec<&'a str> {
    let pattern = format!("{attr}=\"");
    let mut values = Vec::new();
    let mut offset = 0;

    while let Some(found) = html[offset..].find(&pattern) {
        let start = offset + found;
        let value_start = start + pattern.len();
        offset = value_start;

        // `data-src=` and friends are other attributes
        let standalone = html[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace());
        if !standalone {
            continue;
        }

        let Some(len) = html[value_start..].find('"') else {
            break;
        };
        let value = &html[value_start..value_start + len];
        offset = value_start + len + 1;

        if value.ends_with(suffix) {
            values.push(value);
        }
    }

    values
}

/// First referenced script, falling back to the first stylesheet
pub fn first_static_asset(html: &str) -> Option<&str> {
    find_attr_values(html, "src", ".js")
        .into_iter()
        .next()
        .or_else(|| find_attr_values(html, "href", ".css").into_iter().next())
}

/// Resolve an asset reference found on the page at `{base_url}/`
pub fn resolve_asset_url(base_url: &str, reference: &str) -> Result<String, url::ParseError> {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Ok(reference.to_string());
    }
    let page = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
    Ok(page.join(reference)?.to_string())
}
