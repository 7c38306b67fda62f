//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use bookclub_core::navigation::Page;

use crate::app::{AdminView, App, AppState, PAGE_SCROLL_SIZE};
use crate::forms::{can_add_char, FormState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            Ok(false)
        }
        AppState::ConfirmingQuit => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                Ok(true)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
                Ok(false)
            }
            _ => Ok(false),
        },
        AppState::ConfirmingDelete(id) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.delete_book(id),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            Ok(false)
        }
        AppState::Rating => {
            match key.code {
                KeyCode::Char(c @ '1'..='5') => {
                    let rating = c as u8 - b'0';
                    app.rate_selected_event(rating);
                }
                KeyCode::Esc => app.state = AppState::Normal,
                _ => {}
            }
            Ok(false)
        }
        AppState::Editing => {
            handle_editing_input(app, key);
            Ok(false)
        }
        AppState::Normal => handle_normal_input(app, key),
        AppState::Quitting => Ok(true),
    }
}

// ============================================================================
// Text entry
// ============================================================================

/// What a key did to a form
enum FormKey {
    Submit,
    Cancel,
    Handled,
}

fn edit_form(form: &mut FormState, key: KeyEvent) -> FormKey {
    match key.code {
        KeyCode::Enter => return FormKey::Submit,
        KeyCode::Esc => return FormKey::Cancel,
        KeyCode::Tab | KeyCode::Down => form.next(),
        KeyCode::BackTab | KeyCode::Up => form.prev(),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
    FormKey::Handled
}

fn handle_editing_input(app: &mut App, key: KeyEvent) {
    match app.page() {
        Page::Home => match key.code {
            KeyCode::Enter => app.submit_search(),
            KeyCode::Esc => app.state = AppState::Normal,
            KeyCode::Backspace => {
                app.home.search.pop();
            }
            KeyCode::Char(c) => app.push_search_char(c),
            _ => {}
        },
        Page::SignIn => match key.code {
            KeyCode::Enter => app.submit_sign_in(),
            KeyCode::Esc => app.state = AppState::Normal,
            KeyCode::Backspace => {
                app.sign_in_input().pop();
            }
            KeyCode::Char(c) => {
                let input = app.sign_in_input();
                if can_add_char(input.chars().count(), c) {
                    input.push(c);
                }
            }
            _ => {}
        },
        Page::Register => match edit_form(&mut app.register.form, key) {
            FormKey::Submit => app.submit_registration(),
            FormKey::Cancel => app.state = AppState::Normal,
            FormKey::Handled => {}
        },
        Page::Profile => {
            let Some(ref mut form) = app.profile.form else {
                app.state = AppState::Normal;
                return;
            };
            match edit_form(form, key) {
                FormKey::Submit => app.submit_profile(),
                FormKey::Cancel => app.cancel_profile_edit(),
                FormKey::Handled => {}
            }
        }
        Page::Admin => {
            let Some(ref mut editor) = app.admin.editor else {
                app.state = AppState::Normal;
                return;
            };
            match edit_form(&mut editor.form, key) {
                FormKey::Submit => app.submit_book(),
                FormKey::Cancel => app.close_book_editor(),
                FormKey::Handled => {}
            }
        }
    }
}

// ============================================================================
// Normal mode
// ============================================================================

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Keys that work on every page
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => {
            app.go_to_page(Page::Home);
            return Ok(false);
        }
        KeyCode::Char('2') => {
            app.go_to_page(Page::SignIn);
            return Ok(false);
        }
        KeyCode::Char('3') => {
            app.go_to_page(Page::Register);
            return Ok(false);
        }
        KeyCode::Char('4') => {
            app.go_to_page(Page::Profile);
            return Ok(false);
        }
        KeyCode::Char('5') => {
            app.go_to_page(Page::Admin);
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.refresh();
            return Ok(false);
        }
        KeyCode::Char('o') if app.is_signed_in() => {
            app.sign_out();
            return Ok(false);
        }
        _ => {}
    }

    match app.page() {
        Page::Home => handle_home_input(app, key),
        Page::SignIn => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => app.state = AppState::Editing,
            KeyCode::Char('s') => app.resend_code(),
            KeyCode::Char('b') => app.back_to_identifier(),
            _ => {}
        },
        Page::Register => {
            if matches!(key.code, KeyCode::Char('e') | KeyCode::Enter) {
                app.state = AppState::Editing;
            }
        }
        Page::Profile => handle_profile_input(app, key),
        Page::Admin => handle_admin_input(app, key),
    }
    Ok(false)
}

/// Move a list selection, clamped to `len`
fn move_selection(selection: &mut usize, len: usize, key: KeyCode) {
    if len == 0 {
        *selection = 0;
        return;
    }
    let last = len - 1;
    *selection = match key {
        KeyCode::Up | KeyCode::Char('k') => selection.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (*selection + 1).min(last),
        KeyCode::PageUp => selection.saturating_sub(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => (*selection + PAGE_SCROLL_SIZE).min(last),
        KeyCode::Home => 0,
        KeyCode::End => last,
        _ => *selection,
    };
}

fn is_movement(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::Up
            | KeyCode::Down
            | KeyCode::Char('j')
            | KeyCode::Char('k')
            | KeyCode::PageUp
            | KeyCode::PageDown
            | KeyCode::Home
            | KeyCode::End
    )
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    if is_movement(key.code) {
        let len = app.home.events.len();
        move_selection(&mut app.home.selection, len, key.code);
        return;
    }
    match key.code {
        KeyCode::Right => app.events_next_page(),
        KeyCode::Left => app.events_prev_page(),
        KeyCode::Char('/') => app.state = AppState::Editing,
        KeyCode::Char('r') => app.register_for_meeting(),
        KeyCode::Char('c') => app.cancel_current_meeting(),
        KeyCode::Char('f') => app.favorite_selected_event(),
        KeyCode::Char('v') => app.load_reviews_for_selected(),
        KeyCode::Char('t') if app.selected_event().is_some() => app.state = AppState::Rating,
        KeyCode::Esc if !app.home.search.is_empty() => {
            app.home.search.clear();
            app.submit_search();
        }
        _ => {}
    }
}

fn handle_profile_input(app: &mut App, key: KeyEvent) {
    if is_movement(key.code) {
        let len = app.profile_list_len();
        move_selection(&mut app.profile.selection, len, key.code);
        return;
    }
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => app.toggle_profile_section(),
        KeyCode::Char('e') => app.start_profile_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_profile_selection(),
        _ => {}
    }
}

fn handle_admin_input(app: &mut App, key: KeyEvent) {
    if !app.session.is_admin() {
        return;
    }
    if is_movement(key.code) {
        match app.admin.view {
            AdminView::Books => {
                let len = app.admin.books.len();
                move_selection(&mut app.admin.book_selection, len, key.code);
                app.admin.participants = None;
            }
            AdminView::Users => {
                let len = app.admin.users.len();
                move_selection(&mut app.admin.user_selection, len, key.code);
            }
        }
        return;
    }
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => app.toggle_admin_view(),
        KeyCode::Right => app.admin_next_page(),
        KeyCode::Left => app.admin_prev_page(),
        KeyCode::Esc => app.admin.participants = None,
        KeyCode::Char('x') => app.toggle_selected_user_role(),
        _ => {}
    }
    if app.admin.view != AdminView::Books {
        return;
    }
    match key.code {
        KeyCode::Char('a') => app.new_book(),
        KeyCode::Char('e') | KeyCode::Enter => app.edit_selected_book(),
        KeyCode::Char('d') | KeyCode::Delete => app.confirm_delete_selected_book(),
        KeyCode::Char('m') => app.set_selected_book_current(),
        KeyCode::Char('p') => app.show_participants(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_clamps() {
        let mut selection = 0;
        move_selection(&mut selection, 3, KeyCode::Up);
        assert_eq!(selection, 0);
        move_selection(&mut selection, 3, KeyCode::PageDown);
        assert_eq!(selection, 2);
        move_selection(&mut selection, 3, KeyCode::Char('k'));
        assert_eq!(selection, 1);
        move_selection(&mut selection, 0, KeyCode::Down);
        assert_eq!(selection, 0);
    }

    #[test]
    fn test_edit_form_keys() {
        use bookclub_core::validation::Field;
        use crossterm::event::KeyModifiers;

        use crate::forms::Input;

        let mut form = FormState::new(vec![
            Input::new("Title", Field::Title),
            Input::new("Author", Field::Author),
        ]);
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        edit_form(&mut form, key(KeyCode::Char('D')));
        edit_form(&mut form, key(KeyCode::Tab));
        edit_form(&mut form, key(KeyCode::Char('H')));
        edit_form(&mut form, key(KeyCode::Backspace));
        assert_eq!(form.value(0), "D");
        assert_eq!(form.value(1), "");
        assert!(matches!(edit_form(&mut form, key(KeyCode::Enter)), FormKey::Submit));
        assert!(matches!(edit_form(&mut form, key(KeyCode::Esc)), FormKey::Cancel));
    }
}
