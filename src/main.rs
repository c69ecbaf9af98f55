use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};

use cmdgraph::args::{transform, validate};
use cmdgraph::{
    executor, serial, Arg, BoolFlag, Branch, CacheWrapper, FileCompleter, FlagSet, JsonFileStore,
    ListCompleter, OsFs, Processor, ShortcutWrapper, ValueFlag,
};

#[derive(Parser)]
#[command(name = "cmdgraph")]
#[command(about = "Demo command built on the cmdgraph processor engine")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the command; execute-buffer content goes to the tmp file
    Execute {
        /// Path the host shell sources after the command returns
        setup_file: PathBuf,
        /// User arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print completion suggestions, one per line
    Autocomplete {
        /// The raw command line as typed, including the program word
        line: String,
        /// Cursor position as a character offset into the line
        cursor: Option<usize>,
    },
    /// Print the usage tree
    Usage,
}

fn store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cmdgraph_stores.json")
}

/// A small notes command: add/list/search with typed args, flags, file
/// completion, a shortcut namespace, and a cached search.
fn build_notes(store: Arc<Mutex<JsonFileStore>>) -> Arc<dyn Processor> {
    let fsys = Arc::new(OsFs);

    let add = serial(vec![
        Arg::<String>::new("TITLE").validate(validate::non_empty()).node(),
        Arg::<Vec<String>>::list("TAG", 0, None)
            .completer(ListCompleter::new(["todo", "idea", "done"]).distinct())
            .node(),
        FlagSet::new(vec![
            ValueFlag::from_arg(
                Arg::<i64>::new("priority")
                    .validate(validate::int_between(1, 5))
                    .default_fn(|_| Ok(3)),
                Some('p'),
            )
            .def(),
            BoolFlag::new("quiet", 'q').def(),
        ])
        .node(),
        executor("add", |data, out, _| {
            let title = data.string("TITLE").unwrap_or_default();
            let priority = data.int("priority").unwrap_or(3);
            if data.boolean("quiet") != Some(true) {
                out.stdoutln(format!("added \"{title}\" (priority {priority})"));
            }
            Ok(())
        }),
    ]);

    let list = serial(vec![executor("list", |_, out, _| {
        out.stdoutln("no notes yet");
        Ok(())
    })]);

    let search = CacheWrapper::new(
        "notes-search",
        serial(vec![
            Arg::<String>::new("PATTERN")
                .transform(transform::to_lower())
                .node(),
            Arg::<String>::optional("FILE")
                .completer(FileCompleter::new(fsys))
                .node(),
            executor("search", |data, out, _| {
                let pattern = data.string("PATTERN").unwrap_or_default();
                out.stdoutln(format!("searching for \"{pattern}\""));
                Ok(())
            }),
        ]),
        store.clone(),
    )
    .node();

    // "a" would shadow the shortcut wrapper's add keyword, so the add
    // branch carries no single-letter synonym.
    let branch = Arc::new(
        Branch::new(vec![("add", add), ("list ls", list), ("search find", search)])
            .named("notes"),
    );

    ShortcutWrapper::new("notes", branch, store).node()
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("logger init failed: {e}");
    }

    let store = Arc::new(Mutex::new(JsonFileStore::new(store_path())));
    let root = build_notes(store.clone());

    let exit_code = match cli.mode {
        Mode::Execute { setup_file, args } => {
            let outcome = cmdgraph::execute(&root, &args, Some(Path::new(&setup_file)));
            print!("{}", outcome.stdout);
            eprint!("{}", outcome.stderr);
            if let Err(e) = store.lock().unwrap().save() {
                eprintln!("{e}");
            }
            outcome.exit_code
        }
        Mode::Autocomplete { line, cursor } => {
            // The raw line includes the program word; strip it before the
            // engine runs.
            let rest = match line.find(char::is_whitespace) {
                Some(at) => &line[at + 1..],
                None => "",
            };
            let cursor = cursor.map(|c| c.saturating_sub(line.len() - rest.len()));
            match cmdgraph::complete_line(&root, rest, cursor) {
                Ok(suggestions) => {
                    for s in suggestions {
                        println!("{s}");
                    }
                    0
                }
                Err(e) => {
                    eprintln!("{e}");
                    1
                }
            }
        }
        Mode::Usage => {
            print!("{}", cmdgraph::usage(&root));
            0
        }
    };

    std::process::exit(exit_code);
}
