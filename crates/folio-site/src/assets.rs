//! Theme stylesheet.

use folio_config::ThemeConfig;

const BASE_CSS: &str = r#"*,
*::before,
*::after {
  box-sizing: border-box;
}
body {
  margin: 0;
  font-family: system-ui, -apple-system, "Segoe UI", Roboto, Ubuntu, sans-serif;
  line-height: 1.65;
  color: #1c1e21;
  background: #fff;
}
a {
  color: var(--folio-primary);
  text-decoration: none;
}
a:hover {
  text-decoration: underline;
}
.navbar {
  display: flex;
  justify-content: space-between;
  align-items: center;
  height: 3.75rem;
  padding: 0 1rem;
  box-shadow: 0 1px 2px rgba(0, 0, 0, 0.1);
  position: sticky;
  top: 0;
  background: #fff;
  z-index: 10;
}
.navbar-items {
  display: flex;
  align-items: center;
  gap: 1rem;
}
.navbar-brand {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  color: inherit;
}
.navbar-logo {
  height: 2rem;
}
.navbar-link {
  color: inherit;
  font-weight: 500;
}
.layout {
  display: flex;
  max-width: 90rem;
  margin: 0 auto;
}
.sidebar {
  width: 18rem;
  flex-shrink: 0;
  padding: 1rem 0.5rem;
  border-right: 1px solid #dadde1;
  position: sticky;
  top: 3.75rem;
  max-height: calc(100vh - 3.75rem);
  overflow-y: auto;
}
.menu-list {
  list-style: none;
  margin: 0;
  padding-left: 0.75rem;
}
.menu > .menu-list {
  padding-left: 0;
}
.menu-link,
.menu-label {
  display: block;
  padding: 0.3rem 0.75rem;
  border-radius: 0.25rem;
  color: #606770;
}
.menu-link-active {
  color: var(--folio-primary);
  background: rgba(0, 0, 0, 0.05);
  font-weight: 600;
}
.menu-category summary {
  cursor: pointer;
}
.menu-category summary > * {
  display: inline-block;
}
.doc {
  flex: 1;
  min-width: 0;
  padding: 1rem 2rem 3rem;
}
.breadcrumbs ol {
  display: flex;
  flex-wrap: wrap;
  list-style: none;
  padding: 0;
  font-size: 0.875rem;
}
.breadcrumb-item::after {
  content: "/";
  margin: 0 0.5rem;
  color: #8d949e;
}
.breadcrumb-item:last-child::after {
  content: none;
}
.breadcrumb-item-active {
  color: var(--folio-primary);
}
.markdown pre {
  overflow-x: auto;
  padding: 1rem;
  border-radius: 0.4rem;
  color: var(--folio-code-color);
  background: var(--folio-code-background);
}
.markdown code {
  font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace;
  font-size: 0.9em;
}
.markdown table {
  border-collapse: collapse;
}
.markdown th,
.markdown td {
  border: 1px solid #dadde1;
  padding: 0.5rem 0.75rem;
}
.markdown img {
  max-width: 100%;
}
.alert {
  padding: 0.75rem 1rem;
  margin: 1rem 0;
  border-left: 0.3rem solid;
  border-radius: 0.4rem;
}
.alert-title {
  margin: 0 0 0.25rem;
  font-weight: 700;
}
.alert-note {
  border-color: #4cb3d4;
  background: #eef9fd;
}
.alert-tip {
  border-color: #009400;
  background: #e6f6e6;
}
.alert-important {
  border-color: #a371f7;
  background: #f5f0ff;
}
.alert-warning {
  border-color: #e6a700;
  background: #fff8e6;
}
.alert-caution {
  border-color: #e13238;
  background: #ffebec;
}
.edit-this-page {
  margin-top: 2rem;
  font-size: 0.875rem;
}
.pagination {
  display: grid;
  grid-template-columns: 1fr 1fr;
  gap: 1rem;
  margin-top: 2rem;
}
.pagination-link {
  display: block;
  padding: 1rem;
  border: 1px solid #dadde1;
  border-radius: 0.4rem;
}
.pagination-next {
  grid-column: 2;
  text-align: right;
}
.pagination-sublabel {
  display: block;
  font-size: 0.875rem;
  color: #606770;
}
.pagination-label {
  font-weight: 700;
}
.toc {
  width: 15rem;
  flex-shrink: 0;
  padding: 1rem;
  position: sticky;
  top: 3.75rem;
  align-self: flex-start;
  font-size: 0.875rem;
}
.toc ul {
  list-style: none;
  padding: 0;
}
.toc-title {
  font-weight: 700;
  margin-bottom: 0.5rem;
}
.toc-nested {
  padding-left: 1rem;
}
.hero {
  padding: 4rem 2rem;
  text-align: center;
}
.hero-title {
  font-size: 3rem;
  margin: 0 0 1rem;
}
.hero-tagline {
  font-size: 1.5rem;
  color: #606770;
}
.button {
  display: inline-block;
  padding: 0.6rem 1.5rem;
  border-radius: 0.4rem;
  color: #fff;
  background: var(--folio-primary);
  font-weight: 700;
}
.footer {
  padding: 2rem;
}
.footer-dark {
  color: #ebedf0;
  background: #303846;
}
.footer-dark a {
  color: #ebedf0;
}
.footer-light {
  background: #f5f6f7;
}
.footer-links {
  display: flex;
  gap: 4rem;
  justify-content: center;
}
.footer-title {
  font-weight: 700;
}
.footer-links ul {
  list-style: none;
  padding: 0;
}
.footer-copyright {
  margin-top: 1rem;
  text-align: center;
}
@media (max-width: 996px) {
  .sidebar,
  .toc {
    display: none;
  }
}
"#;

/// Code block (background, text) colours per highlighting theme.
const CODE_PALETTES: &[(&str, &str, &str)] = &[
    ("github", "#f6f8fa", "#24292e"),
    ("dracula", "#282a36", "#f8f8f2"),
    ("vsDark", "#1e1e1e", "#d4d4d4"),
    ("vsLight", "#ffffff", "#000080"),
    ("oneDark", "#282c34", "#abb2bf"),
    ("oneLight", "#fafafa", "#383a42"),
];

/// Build the site stylesheet with the theme colours applied.
pub(crate) fn stylesheet(theme: &ThemeConfig) -> String {
    let (background, color) = code_palette(&theme.prism.theme);
    let mut css = String::with_capacity(BASE_CSS.len() + 160);
    css.push_str(":root {\n  --folio-primary: ");
    css.push_str(&theme.colors.primary);
    css.push_str(";\n  --folio-code-background: ");
    css.push_str(background);
    css.push_str(";\n  --folio-code-color: ");
    css.push_str(color);
    css.push_str(";\n}\n");
    css.push_str(BASE_CSS);
    css
}

fn code_palette(name: &str) -> (&'static str, &'static str) {
    let found = CODE_PALETTES
        .iter()
        .find(|(theme, _, _)| theme.eq_ignore_ascii_case(name));
    let (_, background, color) = found.copied().unwrap_or_else(|| {
        tracing::warn!(theme = name, "Unknown theme.prism.theme, using github");
        CODE_PALETTES[0]
    });
    (background, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_theme_colors_injected() {
        let mut theme = ThemeConfig::default();
        theme.colors.primary = "#25c2a0".to_owned();
        let css = stylesheet(&theme);
        assert!(css.starts_with(
            ":root {\n  --folio-primary: #25c2a0;\n  \
             --folio-code-background: #f6f8fa;\n  --folio-code-color: #24292e;\n}\n"
        ));
        assert!(css.contains(".menu-link-active"));
    }

    #[test]
    fn test_prism_theme_selects_code_palette() {
        assert_eq!(code_palette("dracula"), ("#282a36", "#f8f8f2"));
        assert_eq!(code_palette("vsdark"), ("#1e1e1e", "#d4d4d4"));
        assert_eq!(code_palette("unknown"), ("#f6f8fa", "#24292e"));
    }
}
