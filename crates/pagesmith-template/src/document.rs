/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The standalone HTML document every export is wrapped in.

use crate::error::TemplateResult;
use crate::parser::Template;

/// Document shell: title, Tailwind CDN, theme variables, then the template's
/// own head extras and the rendered body.
pub const DOCUMENT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>$title$</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <style>
    :root {
      --background: 0 0% 100%;
      --foreground: 222.2 84% 4.9%;
      --card: 0 0% 100%;
      --card-foreground: 222.2 84% 4.9%;
      --primary: 222.2 47.4% 11.2%;
      --primary-foreground: 210 40% 98%;
      --secondary: 210 40% 96.1%;
      --secondary-foreground: 222.2 47.4% 11.2%;
      --muted: 210 40% 96.1%;
      --muted-foreground: 215.4 16.3% 46.9%;
      --accent: 210 40% 96.1%;
      --accent-foreground: 222.2 47.4% 11.2%;
      --border: 214.3 31.8% 91.4%;
      --ring: 222.2 84% 4.9%;
    }

    .bg-background { background-color: hsl(var(--background)); }
    .text-foreground { color: hsl(var(--foreground)); }
    .bg-card { background-color: hsl(var(--card)); }
    .text-card-foreground { color: hsl(var(--card-foreground)); }
    .bg-primary { background-color: hsl(var(--primary)); }
    .text-primary { color: hsl(var(--primary)); }
    .text-primary-foreground { color: hsl(var(--primary-foreground)); }
    .bg-secondary { background-color: hsl(var(--secondary)); }
    .text-secondary-foreground { color: hsl(var(--secondary-foreground)); }
    .text-muted-foreground { color: hsl(var(--muted-foreground)); }
    .border-border { border-color: hsl(var(--border)); }
  </style>
$head$
</head>
<body>
$body$
</body>
</html>
"#;

/// Compile the document shell.
pub fn document_shell() -> TemplateResult<Template> {
    Template::compile_shell(DOCUMENT_SHELL, "document.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RenderContext, RenderOptions};
    use pagesmith_content::ContentMap;

    #[test]
    fn test_shell_renders() {
        let shell = document_shell().unwrap();
        let content = ContentMap::new();
        let options = RenderOptions::new("A & B");
        let ctx = RenderContext::new(&content, &options)
            .with_head("<link rel=\"icon\" href=\"/favicon.ico\">")
            .with_body("<main>hi</main>");
        let html = shell.render(&ctx);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<link rel=\"icon\" href=\"/favicon.ico\">\n</head>"));
        assert!(html.contains("<body>\n<main>hi</main>\n</body>"));
    }
}
