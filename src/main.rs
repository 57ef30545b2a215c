use std::io::{self, Write};

use anyhow::Result;

use ember::{Editor, RawMode, Screen, TtyInput};

const HELP: &str = "\
ember - a small terminal text editor

USAGE:
  ember [OPTIONS] [FILE]

OPTIONS:
  --debug        log at debug level to stderr
  -h, --help     print this help
  -V, --version  print the version

KEYBOARD SHORTCUTS:
  Ctrl-S  save             Ctrl-A  save as
  Ctrl-O  open file        Ctrl-Q  quit (hold while modified)
  Ctrl-Z  undo             Ctrl-R  redo
  Ctrl-B  set mark         Ctrl-C  copy selection
  Ctrl-X  cut selection    Ctrl-V  paste
";

fn init_logger(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn main() -> Result<()> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }
    if args.contains(["-V", "--version"]) {
        println!("ember {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let debug = args.contains("--debug");
    let filename: Option<String> = args.opt_free_from_str()?;

    init_logger(debug);

    // Restore the terminal before the default panic output, or the report
    // is unreadable in raw mode.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x1b[2J\x1b[H\x1b[?25h");
        let _ = stdout.flush();
        original_hook(info);
    }));

    let _raw = RawMode::enter()?;
    let (cols, rows) = ember::terminal_size();
    let mut editor = Editor::new(Screen::new(cols, rows));
    if let Some(name) = filename.as_deref() {
        editor.load_file(name);
    }
    editor.show_key_help();

    let mut input = TtyInput::new();
    let mut stdout = io::stdout();
    editor.run(&mut input, &mut stdout)
}
