// Styling injected into generated landing pages before they are previewed or exported

const PREVIEW_STYLES: &str = r#"
    <style>
        ::-webkit-scrollbar { width: 6px; }
        ::-webkit-scrollbar-track { background: #000; }
        ::-webkit-scrollbar-thumb { background: #333; border-radius: 3px; }
        ::-webkit-scrollbar-thumb:hover { background: #444; }
        body { overflow-x: hidden; }
    </style>
    "#;

/// Insert the preview style block before the first `</head>`.
///
/// Documents without a head are returned unchanged.
pub fn inject_preview_styles(html: &str) -> String {
    match html.find("</head>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + PREVIEW_STYLES.len());
            out.push_str(&html[..idx]);
            out.push_str(PREVIEW_STYLES);
            out.push_str(&html[idx..]);
            out
        }
        None => html.to_string(),
    }
}
