//! Page renderers.

use frontpage_core::{FrontPage, config::SiteConfig};

use crate::template::{Result, TemplateRegistry, TemplateVars, escape_html};

/// Renders complete HTML documents for the site's pages.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    templates: TemplateRegistry,
    site: SiteConfig,
}

impl PageRenderer {
    /// Create a renderer with the default templates.
    pub fn new(site: SiteConfig) -> Self {
        Self::with_templates(site, TemplateRegistry::new())
    }

    /// Create a renderer with a custom template registry.
    pub fn with_templates(site: SiteConfig, templates: TemplateRegistry) -> Self {
        Self { templates, site }
    }

    /// Render the home page for a fetched `frontPage` document.
    pub fn render_home(&self, page: &FrontPage, draft: bool) -> Result<String> {
        let title = match page.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => self.site.title.as_str(),
        };

        let content = self.templates.render(
            "home",
            &TemplateVars::new().with("headline", escape_html(page.display_title())),
        )?;

        tracing::trace!(draft, "rendered home page");
        self.wrap(title, content, draft)
    }

    /// Render an error page.
    pub fn render_error(&self, status: u16, message: &str) -> Result<String> {
        let content = self.templates.render(
            "error",
            &TemplateVars::new()
                .with("status", status.to_string())
                .with("message", escape_html(message)),
        )?;

        self.wrap(&self.site.title, content, false)
    }

    fn wrap(&self, title: &str, content: String, draft: bool) -> Result<String> {
        let mut vars = TemplateVars::new()
            .with("lang", escape_html(&self.site.lang))
            .with("title", escape_html(title))
            .with("content", content);

        if draft {
            vars.set(
                "draft_banner",
                self.templates.render("draft_banner", &TemplateVars::new())?,
            );
        }

        self.templates.render("base", &vars)
    }
}
