use handlebars::Handlebars;

use crate::core::CalendarConfig;
use crate::render;

pub struct AppState {
    pub config: CalendarConfig,
    pub templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            config,
            templates: render::templates(),
        }
    }
}
