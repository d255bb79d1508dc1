use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissError,
    MoveUp,
    MoveDown,
    PageNext,
    PagePrev,
    NextTab,
    PrevTab,
    CycleView,
    QuickApp(usize),
    Activate,
    Append,
    ClearQueue,
    TogglePlay,
    NextSong,
    PrevSong,
    ReverseSort,
    Refresh,
    OpenGoto,
    OpenSearch,
    PromptChar(char),
    PromptBackspace,
    PromptSubmit,
    ClosePrompt,
    None,
}

/// UI state needed to interpret a key press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputContext {
    pub prompt_open: bool,
    pub has_error: bool,
    pub is_loading: bool,
}

pub fn map_key(key: KeyEvent, ctx: InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // Prompt mode swallows everything else
    if ctx.prompt_open {
        return match key.code {
            KeyCode::Enter => Action::PromptSubmit,
            KeyCode::Esc => Action::ClosePrompt,
            KeyCode::Backspace => Action::PromptBackspace,
            KeyCode::Char(c) => Action::PromptChar(c),
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.has_error {
                Action::DismissError
            } else {
                Action::Quit
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Right | KeyCode::Char('l') => Action::PageNext,
        KeyCode::Left | KeyCode::Char('h') => Action::PagePrev,
        KeyCode::Tab => Action::NextTab,
        KeyCode::BackTab => Action::PrevTab,
        KeyCode::Char('v') => Action::CycleView,
        KeyCode::Enter => Action::Activate,
        KeyCode::Char('a') => Action::Append,
        KeyCode::Char('X') => Action::ClearQueue,
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePlay,
        KeyCode::Char('>') => Action::NextSong,
        KeyCode::Char('<') => Action::PrevSong,
        KeyCode::Char('o') => Action::ReverseSort,
        KeyCode::Char('r') if !ctx.is_loading => Action::Refresh,
        KeyCode::Char('g') => Action::OpenGoto,
        KeyCode::Char('/') => Action::OpenSearch,
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            Action::QuickApp((c as u8 - b'0') as usize)
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn ctx() -> InputContext {
        InputContext::default()
    }

    fn ctx_prompt() -> InputContext {
        InputContext {
            prompt_open: true,
            ..Default::default()
        }
    }

    #[test]
    fn quit_on_q() {
        assert_eq!(map_key(press(KeyCode::Char('q')), ctx()), Action::Quit);
    }

    #[test]
    fn esc_quits_without_error() {
        assert_eq!(map_key(press(KeyCode::Esc), ctx()), Action::Quit);
    }

    #[test]
    fn esc_dismisses_error_when_present() {
        let ctx = InputContext {
            has_error: true,
            ..Default::default()
        };
        assert_eq!(map_key(press(KeyCode::Esc), ctx), Action::DismissError);
    }

    #[test]
    fn ctrl_c_quits_even_in_prompt() {
        assert_eq!(
            map_key(
                press_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
                ctx_prompt()
            ),
            Action::Quit
        );
    }

    #[test]
    fn cursor_movement() {
        assert_eq!(map_key(press(KeyCode::Up), ctx()), Action::MoveUp);
        assert_eq!(map_key(press(KeyCode::Char('k')), ctx()), Action::MoveUp);
        assert_eq!(map_key(press(KeyCode::Down), ctx()), Action::MoveDown);
        assert_eq!(map_key(press(KeyCode::Char('j')), ctx()), Action::MoveDown);
    }

    #[test]
    fn horizontal_keys_page() {
        assert_eq!(map_key(press(KeyCode::Right), ctx()), Action::PageNext);
        assert_eq!(map_key(press(KeyCode::Char('l')), ctx()), Action::PageNext);
        assert_eq!(map_key(press(KeyCode::Left), ctx()), Action::PagePrev);
        assert_eq!(map_key(press(KeyCode::Char('h')), ctx()), Action::PagePrev);
    }

    #[test]
    fn tab_cycles_tabs() {
        assert_eq!(map_key(press(KeyCode::Tab), ctx()), Action::NextTab);
        assert_eq!(map_key(press(KeyCode::BackTab), ctx()), Action::PrevTab);
        assert_eq!(map_key(press(KeyCode::Char('v')), ctx()), Action::CycleView);
    }

    #[test]
    fn playback_controls() {
        assert_eq!(map_key(press(KeyCode::Char(' ')), ctx()), Action::TogglePlay);
        assert_eq!(map_key(press(KeyCode::Char('p')), ctx()), Action::TogglePlay);
        assert_eq!(map_key(press(KeyCode::Char('>')), ctx()), Action::NextSong);
        assert_eq!(map_key(press(KeyCode::Char('<')), ctx()), Action::PrevSong);
    }

    #[test]
    fn refresh_blocked_while_loading() {
        let ctx = InputContext {
            is_loading: true,
            ..Default::default()
        };
        assert_eq!(map_key(press(KeyCode::Char('r')), ctx), Action::None);
    }

    #[test]
    fn quick_app_digits() {
        for d in 1..=9u8 {
            let c = (b'0' + d) as char;
            assert_eq!(
                map_key(press(KeyCode::Char(c)), ctx()),
                Action::QuickApp(d as usize)
            );
        }
        assert_eq!(map_key(press(KeyCode::Char('0')), ctx()), Action::None);
    }

    #[test]
    fn unbound_key_is_none() {
        assert_eq!(map_key(press(KeyCode::Char('z')), ctx()), Action::None);
    }

    #[test]
    fn non_press_events_filtered() {
        assert_eq!(map_key(release(KeyCode::Char('q')), ctx()), Action::None);
    }

    // --- Prompt mode ---

    #[test]
    fn prompt_captures_characters() {
        assert_eq!(
            map_key(press(KeyCode::Char('q')), ctx_prompt()),
            Action::PromptChar('q')
        );
        assert_eq!(
            map_key(press(KeyCode::Char('/')), ctx_prompt()),
            Action::PromptChar('/')
        );
    }

    #[test]
    fn prompt_submit_and_close() {
        assert_eq!(map_key(press(KeyCode::Enter), ctx_prompt()), Action::PromptSubmit);
        assert_eq!(map_key(press(KeyCode::Esc), ctx_prompt()), Action::ClosePrompt);
        assert_eq!(
            map_key(press(KeyCode::Backspace), ctx_prompt()),
            Action::PromptBackspace
        );
    }

    #[test]
    fn prompt_ignores_navigation_keys() {
        assert_eq!(map_key(press(KeyCode::Up), ctx_prompt()), Action::None);
        assert_eq!(map_key(press(KeyCode::Tab), ctx_prompt()), Action::None);
    }

    #[test]
    fn overlay_openers() {
        assert_eq!(map_key(press(KeyCode::Char('g')), ctx()), Action::OpenGoto);
        assert_eq!(map_key(press(KeyCode::Char('/')), ctx()), Action::OpenSearch);
    }
}
