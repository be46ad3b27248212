use anyhow::Context;
use tera::Tera;

pub const LAYOUT_TEMPLATE: &str = "layout::default";
pub const REGISTRATION_TEMPLATE: &str = "user-manager::registration";
pub const HOME_TEMPLATE: &str = "app::home";

/// Variables made available to a template for a single render.
#[derive(Debug, Default, Clone)]
pub struct ViewModel {
    context: tera::Context,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable<T>(&mut self, name: &str, value: &T)
    where
        T: serde::Serialize + ?Sized,
    {
        self.context.insert(name, value);
    }
}

pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template_name: &str, model: &ViewModel) -> Result<String, anyhow::Error>;
}

pub struct TeraRenderer {
    tera: Tera,
    app_name: String,
}

impl TeraRenderer {
    pub fn new(app_name: impl Into<String>) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        // Names carry no file extension, so escape every template.
        tera.autoescape_on(vec![""]);
        tera.add_raw_templates(vec![
            (LAYOUT_TEMPLATE, include_str!("../templates/layout/default.html")),
            (REGISTRATION_TEMPLATE, include_str!("../templates/user-manager/registration.html")),
            (HOME_TEMPLATE, include_str!("../templates/app/home.html")),
        ])?;
        Ok(Self {
            tera,
            app_name: app_name.into(),
        })
    }
}

impl TemplateRenderer for TeraRenderer {
    #[tracing::instrument(name = "Render template", skip(self, model))]
    fn render(&self, template_name: &str, model: &ViewModel) -> Result<String, anyhow::Error> {
        let mut context = model.context.clone();
        context.insert("app_name", &self.app_name);
        self.tera
            .render(template_name, &context)
            .with_context(|| format!("Failed to render template `{}`", template_name))
    }
}
