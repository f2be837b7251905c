//! Quill - a multi-pane, Emacs-model text editor
//! Main entry point

use anyhow::Context;

use quill::editor::Editor;
use quill::host::cell::CellHost;

fn main() {
    let _log_guard = quill::log::init();

    if let Err(e) = run() {
        eprintln!("quill: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Create host backend
    let host = CellHost::new().context("failed to open the display")?;

    // Create editor
    let mut editor = Editor::new(host).context("failed to initialize editor")?;

    // Positional arguments are files; leading-dash arguments are ignored
    let args: Vec<String> = std::env::args().skip(1).collect();
    editor.open_initial_files(&args);

    // Run editor
    let code = editor.run().context("editor error")?;
    std::process::exit(code);
}
