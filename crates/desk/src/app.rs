use crate::chart::ChartModel;
use crate::date_picker::DatePicker;
use crate::editor::TextEditor;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use folio_core::domain::ComparisonRun;
use folio_core::error::CompareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    StartDate,
    EndDate,
    Portfolios,
    CompareButton,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::StartDate,
        Focus::EndDate,
        Focus::Portfolios,
        Focus::CompareButton,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Compare,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
}

/// The last successful comparison and its precomputed chart.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub run: ComparisonRun,
    pub chart: ChartModel,
}

pub struct App {
    pub start: DatePicker,
    pub end: DatePicker,
    pub editor: TextEditor,
    pub focus: Focus,
    pub today: NaiveDate,
    pub busy: bool,
    pub rendered: Option<Rendered>,
    pub error: Option<ErrorDialog>,
}

impl App {
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate, portfolios: &str) -> Self {
        Self {
            start: DatePicker::new(start),
            end: DatePicker::new(end),
            editor: TextEditor::new(portfolios),
            focus: Focus::StartDate,
            today,
            busy: false,
            rendered: None,
            error: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return Action::Quit;
        }

        // The error dialog is modal.
        if self.error.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.error = None;
            }
            return Action::None;
        }

        if key.code == KeyCode::F(5) || (ctrl && key.code == KeyCode::Char('r')) {
            return Action::Compare;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Action::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::StartDate => {
                let today = self.today;
                date_key(&mut self.start, key.code, today)
            }
            Focus::EndDate => {
                let today = self.today;
                date_key(&mut self.end, key.code, today)
            }
            Focus::Portfolios => {
                if !ctrl {
                    editor_key(&mut self.editor, key.code);
                }
                Action::None
            }
            Focus::CompareButton => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Action::Compare,
                _ => Action::None,
            },
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.error.is_none() && self.focus == Focus::Portfolios {
            self.editor.insert_str(text);
        }
    }

    pub fn begin_comparison(&mut self) {
        self.busy = true;
    }

    pub fn finish_comparison(&mut self, outcome: Result<ComparisonRun, CompareError>) {
        self.busy = false;
        match outcome {
            Ok(run) => {
                let chart = ChartModel::from_run(&run);
                self.rendered = Some(Rendered { run, chart });
            }
            Err(err) => {
                tracing::warn!(stage = err.stage(), error = %err, "comparison failed");
                self.error = Some(ErrorDialog {
                    title: err.title().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
}

fn date_key(picker: &mut DatePicker, code: KeyCode, today: NaiveDate) -> Action {
    match code {
        KeyCode::Up | KeyCode::Right | KeyCode::Char('+') => picker.next_day(),
        KeyCode::Down | KeyCode::Left | KeyCode::Char('-') => picker.prev_day(),
        KeyCode::PageUp => picker.next_month(),
        KeyCode::PageDown => picker.prev_month(),
        KeyCode::Char('t') => picker.set(today),
        _ => {}
    }
    Action::None
}

fn editor_key(editor: &mut TextEditor, code: KeyCode) {
    match code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Enter => editor.newline(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.home(),
        KeyCode::End => editor.end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::{ComparisonResult, ReturnSeries};
    use folio_core::parse::{parse_portfolios, ParseError, EXAMPLE_PORTFOLIOS};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn app() -> App {
        App::new(d(10), d(10), d(10), EXAMPLE_PORTFOLIOS)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn tab_cycles_focus() {
        let mut a = app();
        a.handle_key(key(KeyCode::Tab));
        assert_eq!(a.focus, Focus::EndDate);
        a.handle_key(key(KeyCode::Tab));
        a.handle_key(key(KeyCode::Tab));
        assert_eq!(a.focus, Focus::CompareButton);
        a.handle_key(key(KeyCode::Tab));
        assert_eq!(a.focus, Focus::StartDate);
        a.handle_key(key(KeyCode::BackTab));
        assert_eq!(a.focus, Focus::CompareButton);
    }

    #[test]
    fn date_keys_step_and_reset() {
        let mut a = app();
        a.handle_key(key(KeyCode::Down));
        a.handle_key(key(KeyCode::Down));
        assert_eq!(a.start.date(), d(8));
        a.handle_key(key(KeyCode::Char('t')));
        assert_eq!(a.start.date(), d(10));
        assert_eq!(a.end.date(), d(10));
    }

    #[test]
    fn typing_edits_only_the_focused_editor() {
        let mut a = app();
        a.handle_key(key(KeyCode::Char('x')));
        assert_eq!(a.editor.text(), EXAMPLE_PORTFOLIOS);

        a.focus = Focus::Portfolios;
        a.handle_key(key(KeyCode::Char('#')));
        assert!(a.editor.text().starts_with("#{"));
    }

    #[test]
    fn compare_triggers() {
        let mut a = app();
        assert_eq!(a.handle_key(key(KeyCode::F(5))), Action::Compare);
        assert_eq!(a.handle_key(ctrl('r')), Action::Compare);
        a.focus = Focus::CompareButton;
        assert_eq!(a.handle_key(key(KeyCode::Enter)), Action::Compare);
        assert_eq!(a.handle_key(ctrl('q')), Action::Quit);
    }

    #[test]
    fn error_dialog_blocks_input_until_dismissed() {
        let mut a = app();
        a.begin_comparison();
        a.finish_comparison(Err(CompareError::Parse(ParseError::new(1, 2, "boom"))));
        assert!(!a.busy);
        let dialog = a.error.clone().unwrap();
        assert_eq!(dialog.title, "Invalid portfolios");
        assert!(dialog.message.contains("line 1, column 2: boom"));

        assert_eq!(a.handle_key(key(KeyCode::F(5))), Action::None);
        assert_eq!(a.handle_key(key(KeyCode::Tab)), Action::None);
        assert_eq!(a.focus, Focus::StartDate);

        a.handle_key(key(KeyCode::Esc));
        assert!(a.error.is_none());
    }

    #[test]
    fn successful_run_replaces_chart() {
        let mut a = app();
        let run = ComparisonRun {
            spec: parse_portfolios("{'A': {'X': 1}}").unwrap(),
            start: d(2),
            end: d(3),
            result: ComparisonResult::new(
                vec![d(2), d(3)],
                vec![ReturnSeries {
                    name: "A".to_string(),
                    values: vec![0.0, 0.5],
                }],
            )
            .unwrap(),
        };
        a.finish_comparison(Ok(run));
        let rendered = a.rendered.as_ref().unwrap();
        assert_eq!(rendered.chart.lines[0].final_pct, Some(50.0));
        assert!(a.error.is_none());
    }
}
