use std::sync::Arc;

use portfolio_di::Build;
use portfolio_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use portfolio_utils::trace_instrument;
use tera::Tera;

#[derive(Debug, Clone, Build)]
pub struct TemplateServiceImpl {
    #[state]
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl Default for State {
    fn default() -> Self {
        // Template names carry no file extension, so tera does not auto
        // escape. Values are escaped by the callers.
        let mut tera = Tera::default();

        tera.add_raw_template("base", BASE_TEMPLATE).unwrap();

        for &(name, template) in TEMPLATES {
            tera.add_raw_template(name, template).unwrap();
        }

        Self(tera.into())
    }
}

impl TemplateService for TemplateServiceImpl {
    #[trace_instrument(skip(self, template), fields(template = T::NAME))]
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.state.0.render(T::NAME, &context).map_err(Into::into)
    }
}
