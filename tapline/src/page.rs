use metronome::TestController;
use ratatui::{Frame, layout::Rect, text::Line};

pub mod error;
pub mod loadscreen;
pub mod results;
pub mod typing;

pub use error::Error;
pub use loadscreen::Loading;
pub use results::Results;
pub use typing::Typing;

macro_rules! make_page_enum {
    ($($t:tt),*) => {
        #[derive(Debug)]
        pub enum Page {
            $(
                $t(Box<$t>),
            )*
        }

        $(
            impl From<$t> for Page {
                fn from(value: $t) -> Page {
                    Page::$t(Box::new(value))
                }
            }
        )*
    };
}

make_page_enum!(Loading, Typing, Results, Error);

impl Page {
    pub fn render(&self, frame: &mut Frame, area: Rect, controller: &TestController) {
        match self {
            Self::Loading(page) => page.render(frame, area),
            Self::Typing(page) => page.render(frame, area, controller),
            Self::Results(page) => page.render(frame, area),
            Self::Error(page) => page.render(frame, area),
        }
    }

    pub fn render_top(&self, controller: &TestController) -> Option<Line<'_>> {
        match self {
            Self::Loading(_) => None,
            Self::Typing(page) => page.render_top(controller),
            Self::Results(page) => page.render_top(),
            Self::Error(page) => page.render_top(),
        }
    }
}
