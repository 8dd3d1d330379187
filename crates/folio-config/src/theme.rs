//! Theme configuration: navbar, footer, colors and syntax highlighting.

use serde::Deserialize;

use crate::{ConfigError, require_non_empty};

/// Theme configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Top navigation bar.
    pub navbar: NavbarConfig,
    /// Page footer.
    pub footer: FooterConfig,
    /// Color tokens.
    pub colors: ColorsConfig,
    /// Code highlighting options.
    pub prism: PrismConfig,
}

/// Navbar configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    /// Brand title. Falls back to the site title.
    pub title: Option<String>,
    /// Logo image path, relative to the site root.
    pub logo: Option<String>,
    /// Navbar links.
    pub items: Vec<NavbarItem>,
}

/// Which side of the navbar an item is placed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavbarPosition {
    #[default]
    Left,
    Right,
}

/// A navbar link.
///
/// Exactly one of `to` (site-internal path) or `href` (external URL) is set.
#[derive(Debug, Deserialize)]
pub struct NavbarItem {
    /// Link text.
    pub label: String,
    /// Site-internal path, relative to `base_url`.
    pub to: Option<String>,
    /// External URL.
    pub href: Option<String>,
    /// Placement.
    #[serde(default)]
    pub position: NavbarPosition,
}

/// Footer color scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    Light,
    #[default]
    Dark,
}

/// Footer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    /// Color scheme.
    pub style: FooterStyle,
    /// Link columns.
    pub links: Vec<FooterLinkColumn>,
    /// Copyright line.
    pub copyright: Option<String>,
}

/// A titled column of footer links.
#[derive(Debug, Deserialize)]
pub struct FooterLinkColumn {
    /// Column heading.
    pub title: String,
    /// Links in the column.
    #[serde(default)]
    pub items: Vec<FooterLink>,
}

/// A footer link. Same `to`/`href` rule as [`NavbarItem`].
#[derive(Debug, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub to: Option<String>,
    pub href: Option<String>,
}

/// Color tokens injected into the stylesheet.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Primary brand color.
    pub primary: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            primary: "#2e8555".to_owned(),
        }
    }
}

/// Syntax highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    /// Highlighting theme name. Selects the code block colours in the
    /// generated stylesheet (`github`, `dracula`, `vsDark`, `vsLight`,
    /// `oneDark`, `oneLight`).
    pub theme: String,
    /// Languages beyond the default set.
    pub additional_languages: Vec<String>,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            theme: "github".to_owned(),
            additional_languages: Vec::new(),
        }
    }
}

impl ThemeConfig {
    /// Validate theme settings.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (i, item) in self.navbar.items.iter().enumerate() {
            let field = format!("theme.navbar.items[{i}]");
            require_non_empty(&item.label, &format!("{field}.label"))?;
            require_single_target(item.to.as_deref(), item.href.as_deref(), &field)?;
        }

        for (i, column) in self.footer.links.iter().enumerate() {
            let field = format!("theme.footer.links[{i}]");
            require_non_empty(&column.title, &format!("{field}.title"))?;
            for (j, link) in column.items.iter().enumerate() {
                let field = format!("{field}.items[{j}]");
                require_non_empty(&link.label, &format!("{field}.label"))?;
                require_single_target(link.to.as_deref(), link.href.as_deref(), &field)?;
            }
        }

        if !self.colors.primary.starts_with('#') {
            return Err(ConfigError::Validation(
                "theme.colors.primary must be a hex color like #2e8555".to_owned(),
            ));
        }

        require_non_empty(&self.prism.theme, "theme.prism.theme")?;
        Ok(())
    }
}

/// Require exactly one of `to` or `href`.
fn require_single_target(
    to: Option<&str>,
    href: Option<&str>,
    field: &str,
) -> Result<(), ConfigError> {
    match (to, href) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(ConfigError::Validation(format!(
            "{field} cannot set both 'to' and 'href'"
        ))),
        (None, None) => Err(ConfigError::Validation(format!(
            "{field} requires 'to' or 'href'"
        ))),
    }
}
