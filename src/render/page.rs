// HTML page embedding the chart as a data URI

/// Build the index page around a base64 PNG
pub fn render_index_page(plot_base64: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Climate Tracker</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            margin: 0;
            padding: 40px 20px;
            background: #f5f7fa;
            color: #2c3e50;
            text-align: center;
        }}
        img {{
            max-width: 100%;
            height: auto;
            background: white;
            border-radius: 8px;
            box-shadow: 0 2px 12px rgba(0, 0, 0, 0.1);
        }}
    </style>
</head>
<body>
    <h1>Climate Tracker</h1>
    <img src="data:image/png;base64,{plot_base64}" alt="Climate Data Plot" />
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_embeds_payload() {
        let page = render_index_page("iVBORw0KGgo=");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<img src="data:image/png;base64,iVBORw0KGgo=""#));
        assert!(page.contains("<title>Climate Tracker</title>"));
    }
}
