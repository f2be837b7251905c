//! Built-in commands
//!
//! Every named function the dispatcher can reach, with its default
//! bindings, registered in one place. Commands are plain functions of
//! (editor, context); the registry stores them by name and binding.

use crate::constants::keys;
use crate::editor::{Editor, WellKnown};
use crate::host::HostEnv;
use crate::key::{seq_char, seq_ctrl, seq_ctrl_x, seq_ctrl_x_ctrl, seq_ext, seq_meta};
use crate::registry::Registry;

mod edit;
mod file;
mod kill;
mod lists;
mod motion;
mod panes;
mod search;

pub use kill::run_select_line;

/// Register every built-in command and remember the repeat-sensitive ids
pub fn install<H: HostEnv>(reg: &mut Registry<Editor<H>>, known: &mut WellKnown) {
    // Pane and frame management
    reg.register("split-pane", panes::split_pane, &[seq_ctrl_x('2')]);
    reg.register("kill-pane", panes::kill_pane, &[seq_ctrl_x('0')]);
    reg.register("kill-other-panes", panes::kill_other_panes, &[seq_ctrl_x('1')]);
    reg.register("other-pane", panes::other_pane, &[seq_ctrl_x('o')]);
    reg.register("new-frame", panes::new_frame, &[chord(&[seq_ctrl_x('5'), seq_char('2')])]);
    reg.register("other-frame", panes::other_frame, &[chord(&[seq_ctrl_x('5'), seq_char('o')])]);
    reg.register("delete-frame", panes::delete_frame, &[chord(&[seq_ctrl_x('5'), seq_char('0')])]);
    reg.register(
        "delete-other-frames",
        panes::delete_other_frames,
        &[chord(&[seq_ctrl_x('5'), seq_char('1')])],
    );

    // Motion
    reg.register("forward-char", motion::forward_char, &[seq_ctrl('f'), seq_ext(keys::EXT_RIGHT)]);
    reg.register("backward-char", motion::backward_char, &[seq_ctrl('b'), seq_ext(keys::EXT_LEFT)]);
    reg.register("forward-word", motion::forward_word, &[seq_meta('f')]);
    reg.register("backward-word", motion::backward_word, &[seq_meta('b')]);
    reg.register("forward-row", motion::forward_row, &[seq_ctrl('n'), seq_ext(keys::EXT_DOWN)]);
    reg.register("backward-row", motion::backward_row, &[seq_ctrl('p'), seq_ext(keys::EXT_UP)]);
    reg.register("forward-page", motion::forward_page, &[seq_ctrl('v'), seq_ext(keys::EXT_PAGE_DOWN)]);
    reg.register("backward-page", motion::backward_page, &[seq_meta('v'), seq_ext(keys::EXT_PAGE_UP)]);
    reg.register("goto-start-of-line", motion::goto_start_of_line, &[seq_ctrl('a'), seq_ext(keys::EXT_HOME)]);
    reg.register("goto-end-of-line", motion::goto_end_of_line, &[seq_ctrl('e'), seq_ext(keys::EXT_END)]);
    reg.register("goto-start", motion::goto_start, &[seq_meta('<')]);
    reg.register("goto-end", motion::goto_end, &[seq_meta('>')]);
    reg.register("recenter-page", motion::recenter_page, &[seq_ctrl('l')]);
    reg.register("goto-line", motion::goto_line, &[seq_meta('g')]);
    reg.register("goto-char", motion::goto_char, &[]);

    // Marks and selection
    reg.register("set-mark", kill::set_mark, &[seq_ctrl(' ')]);
    reg.register("exchange-point-and-mark", kill::exchange_point_and_mark, &[seq_ctrl_x_ctrl('x')]);
    reg.register("select-line", kill::select_line, &[]);
    reg.register("select-area", kill::select_area, &[]);
    reg.register("select-all", kill::select_all, &[seq_ctrl_x('h')]);
    reg.register("cursor-info", lists::cursor_info, &[seq_ctrl_x('=')]);

    // Editing
    reg.register("insert-newline", edit::insert_newline, &[vec![0x0D]]);
    reg.register("insert-tab", edit::insert_tab, &[vec![0x09]]);
    reg.register("delete-forward", edit::delete_forward, &[seq_ctrl('d'), seq_ext(keys::EXT_DELETE)]);
    reg.register("delete-backward", edit::delete_backward, &[vec![0x08]]);
    known.delete_word_forward =
        reg.register("delete-word-forward", edit::delete_word_forward, &[seq_meta('d')]);
    known.delete_word_backward = reg.register(
        "delete-word-backward",
        edit::delete_word_backward,
        &[vec![keys::META, 0x08]],
    );
    reg.register("delete-horiz-space", edit::delete_horiz_space, &[seq_meta('\\')]);
    reg.register("join-lines", edit::join_lines, &[seq_meta('^')]);
    reg.register("downcase-word", edit::downcase_word, &[seq_meta('l')]);
    reg.register("upcase-word", edit::upcase_word, &[seq_meta('u')]);
    reg.register("capitalize-word", edit::capitalize_word, &[seq_meta('c')]);

    // Kill ring
    known.yank = reg.register("yank", kill::yank, &[seq_ctrl('y')]);
    known.yank_pop = reg.register("yank-pop", kill::yank_pop, &[seq_meta('y')]);
    known.kill_line = reg.register("kill-line", kill::kill_line, &[seq_ctrl('k')]);
    known.kill_region = reg.register("kill-region", kill::kill_region, &[seq_ctrl('w')]);
    reg.register("copy-region", kill::copy_region, &[seq_meta('w')]);

    // Buffers and files
    reg.register("unmodify", lists::unmodify, &[seq_meta('~')]);
    reg.register("find-file", file::find_file, &[seq_ctrl_x_ctrl('f')]);
    reg.register("save-file", file::save_file, &[seq_ctrl_x_ctrl('s')]);
    reg.register("write-file", file::write_file, &[seq_ctrl_x_ctrl('w')]);
    reg.register("save-some-files", file::save_some_files, &[seq_ctrl_x('s')]);
    reg.register("insert-file", file::insert_file, &[seq_ctrl_x('i')]);
    reg.register("switch-to-buffer", file::switch_to_buffer, &[seq_ctrl_x('b')]);
    reg.register("kill-buffer", file::kill_buffer, &[seq_ctrl_x('k')]);
    reg.register("pwd", file::pwd, &[]);
    reg.register("save-and-quit", file::save_and_quit, &[seq_ctrl_x_ctrl('c')]);
    reg.register("quit", file::quit, &[]);

    // Pop-up lists
    reg.register("popup-mark-list", lists::popup_mark_list, &[]);
    reg.register("popup-kill-list", lists::popup_kill_list, &[]);
    reg.register("popup-command-list", lists::popup_command_list, &[]);
    reg.register("popup-buffer-list", lists::popup_buffer_list, &[seq_ctrl_x_ctrl('b')]);
    reg.register("help", lists::help, &[seq_ext(keys::EXT_FN_BASE)]);

    // Search and replace
    reg.register("search-forward", search::search_forward, &[seq_ctrl('s')]);
    reg.register("search-backward", search::search_backward, &[seq_ctrl('r')]);
    reg.register("query-replace", search::query_replace, &[seq_meta('%')]);

    // Undo
    known.undo = reg.register("undo", search::undo, &[seq_ctrl('_'), seq_ctrl_x('u')]);
    reg.register("reset-undo", search::reset_undo, &[]);
    reg.register("disable-undo", search::disable_undo, &[]);

    // Dispatch surface
    known.execute_named =
        reg.register("execute-named-command", lists::execute_named_command, &[seq_meta('x')]);
    reg.register("set-option", lists::set_option, &[]);
}

/// Concatenate helper sequences into one chord
fn chord(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}

/// True when the previous command was a killing command, so the next kill
/// coalesces into the ring's top entry
pub(crate) fn last_was_kill<H: HostEnv>(ed: &Editor<H>) -> bool {
    let known = ed.known;
    matches!(
        ed.dispatch.last_command,
        Some(last)
            if last == known.kill_line
                || last == known.kill_region
                || last == known.delete_word_forward
                || last == known.delete_word_backward
    )
}

/// End of the word after `pos`: crosses separators, then the word
pub(crate) fn motion_word_end(text: &crate::buffer::gap::GapBuffer, mut pos: usize) -> usize {
    use crate::buffer::gap::is_word_byte;
    let len = text.len();
    while pos < len && !is_word_byte(text.byte_at(pos)) {
        pos = text.step_forward(pos);
    }
    while pos < len && is_word_byte(text.byte_at(pos)) {
        pos = text.step_forward(pos);
    }
    pos
}

/// Start of the word before `pos`
pub(crate) fn motion_word_start(text: &crate::buffer::gap::GapBuffer, mut pos: usize) -> usize {
    use crate::buffer::gap::is_word_byte;
    while pos > 0 && !is_word_byte(text.byte_at(text.step_backward(pos))) {
        pos = text.step_backward(pos);
    }
    while pos > 0 && is_word_byte(text.byte_at(text.step_backward(pos))) {
        pos = text.step_backward(pos);
    }
    pos
}
