/// Server-side template rendering
///
/// Templates are compiled into the binary and registered with Tera under
/// their file names; `.html` templates are autoescaped.

use crate::error::AppResult;
use axum::response::Html;
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../templates/base.html")),
    ("homepage.html", include_str!("../templates/homepage.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("profile_edit.html", include_str!("../templates/profile_edit.html")),
    ("project.html", include_str!("../templates/project.html")),
];

/// Compiled template set
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Parse and register every page template
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Render `name` with `context` into an HTML response body
    pub fn render(&self, name: &str, context: &Context) -> AppResult<Html<String>> {
        Ok(Html(self.tera.render(name, context)?))
    }
}
