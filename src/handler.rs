use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, AppMode};

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }
    match app.mode {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Search => handle_search_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Right | KeyCode::Char('l') => app.expand_selected(),
        KeyCode::Left | KeyCode::Char('h') => app.collapse_selected(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Char('t') => app.toggle_tree_matches(),
        KeyCode::Char('f') => app.toggle_fuzzy(),
        KeyCode::Char('s') => app.toggle_streaming(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.finish_search(),
        KeyCode::Backspace => app.search_delete_char(),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Char(c) => app.search_input_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instrument_tree::config::{AppConfig, FeedConfig};

    fn setup_app() -> App {
        let config = AppConfig {
            feed: FeedConfig {
                tickers: Some(vec!["F".into(), "AMZN".into()]),
                prices_per_contract: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        App::new(&config, None).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn q_quits_in_normal_mode() {
        let mut app = setup_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn ctrl_c_quits_in_search_mode() {
        let mut app = setup_app();
        press(&mut app, KeyCode::Char('/'));
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn arrows_move_selection() {
        let mut app = setup_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_index(), Some(2));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_index(), Some(1));
    }

    #[test]
    fn left_right_and_enter_change_collapse_state() {
        let mut app = setup_app();
        let rows = app.row_count();
        press(&mut app, KeyCode::Left);
        assert!(app.row_count() < rows);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.row_count(), rows);
        press(&mut app, KeyCode::Enter);
        assert!(app.row_count() < rows);
    }

    #[test]
    fn slash_enters_search_and_typing_filters() {
        let mut app = setup_app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, AppMode::Search);
        for c in "amzn".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.query, "amzn");
        // 'q' is text while searching.
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.row_count(), 0);

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.query, "amzn");
        assert_eq!(app.row_count(), 37);
    }

    #[test]
    fn esc_clears_search() {
        let mut app = setup_app();
        let rows = app.row_count();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.query.is_empty());
        assert_eq!(app.row_count(), rows);
    }

    #[test]
    fn toggles() {
        let mut app = setup_app();
        let tree_matches = app.search.tree_matches;
        press(&mut app, KeyCode::Char('t'));
        assert_ne!(app.search.tree_matches, tree_matches);
        press(&mut app, KeyCode::Char('f'));
        assert!(app.search.fuzzy);
        press(&mut app, KeyCode::Char('s'));
        assert!(app.streaming);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = setup_app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut app, key);
        assert!(!app.should_quit);
    }
}
