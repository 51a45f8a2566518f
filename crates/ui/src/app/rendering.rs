use super::App;
use crate::components::{AlertPopup, Footer, Header, LoginView};
use crate::layout::{ChatLayout, inset_area};
use crate::state::View;
use crate::theme::Theme;
use crate::transcript::TranscriptRenderer;

use ratatui::{Frame, widgets::Block};

impl App {
    /// Draw the current view, then the alert on top
    pub fn render(&self, frame: &mut Frame<'_>) {
        let size = frame.area();
        frame.render_widget(Block::default().style(Theme::base()), size);

        match self.state.view {
            View::Login => LoginView::new(&self.state).render(frame, size),
            View::Chat => {
                let content_area = inset_area(size, 1, 0);
                let input_lines = self.state.input.buffer.split('\n').count();
                let layout = ChatLayout::calculate(content_area, input_lines);

                Header::new(&self.state).render(frame, layout.header);
                TranscriptRenderer::new(&self.transcript, self.state.tick).render(frame, layout.transcript);
                Footer::new(&self.state).render(frame, layout.footer);
            }
        }

        if let Some(alert) = &self.state.alert {
            AlertPopup::new(alert).render(frame, size);
        }
    }

    /// Whether anything on screen animates between events
    pub fn is_animating(&self) -> bool {
        self.transcript.last().is_some_and(|bubble| bubble.is_loading())
    }
}
