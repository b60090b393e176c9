use chrono::Local;
use clap::Parser;
use kslib::{
    catalog::{StatisticsSnapshot, load_catalog},
    prefix_tree::{PrefixTree, TreeConfig},
};
use memory_stats::memory_stats;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Suggest catalog items for typed prefixes
#[derive(Parser)]
struct Cli {
    /// Path to a catalog file, one `value: alias; alias` item per line
    catalog: PathBuf,
    /// How many suggestions to print per query
    #[arg(long, default_value_t = 5)]
    limit: usize,
    /// How many recently used items to remember
    #[arg(long, default_value_t = 5)]
    recent: usize,
    /// JSON file with usage statistics, restored on start and written on exit
    #[arg(long)]
    stats: Option<PathBuf>,
}

/// Run one command line against `tree`, writing its answer to `out`. Command errors are reported
/// on `out`, only failing writes end up in the returned error.
fn run_command(
    tree: &mut PrefixTree<String>,
    line: &str,
    limit: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let result = match cmd {
        "?" => {
            for (rank, suggestion) in tree.suggest(rest, limit).iter().enumerate() {
                let keyword = suggestion.keyword.map_or("", |kw| kw.text());
                writeln!(out, "{:2}. {} ({keyword})", rank + 1, suggestion.value)?;
            }
            Ok(())
        }
        "!" => {
            let (value, keyword) = match rest.split_once(" | ") {
                Some((value, keyword)) => (value.trim(), Some(keyword.trim())),
                None => (rest, None),
            };
            match tree.find_content(&value.to_string()) {
                Some(id) => {
                    tree.read(id, true);
                    if let Some(keyword) = keyword {
                        tree.read_with_keyword(id, keyword);
                    }
                    Ok(())
                }
                None => Err(format!("unknown item {value:?}")),
            }
        }
        "mv" => match rest.split(" | ").map(str::trim).collect::<Vec<_>>()[..] {
            [value, from, to] if tree.move_content(from, to, &value.to_string()) => Ok(()),
            [_, _, _] => Err("nothing moved".to_string()),
            _ => Err("usage: mv <value> | <from> | <to>".to_string()),
        },
        "rm" => match rest.split_once(" | ") {
            Some((value, keyword)) if tree.delete(keyword.trim(), &value.trim().to_string()) => {
                Ok(())
            }
            Some(_) => Err("nothing deleted".to_string()),
            None => Err("usage: rm <value> | <keyword>".to_string()),
        },
        "recent" => {
            let recent: Vec<_> = tree.recent().collect();
            for id in recent {
                if let Some(content) = tree.content(id) {
                    writeln!(out, "{}", content.value())?;
                }
            }
            Ok(())
        }
        _ => Err(format!("unknown command {cmd:?}")),
    };
    if let Err(msg) = result {
        writeln!(out, "error: {msg}")?;
    }
    out.flush()
}

fn main() -> ExitCode {
    let args = Cli::parse();
    env_logger::builder()
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level()).bold();
            writeln!(
                buf,
                "{}|{level_style}{:7}{level_style:#}|{:10}| {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let mut tree = PrefixTree::with_config(TreeConfig {
        recent_cutoff: args.recent,
    });
    if let Err(err) = load_catalog(&args.catalog, &mut tree) {
        log::error!("{err}");
        return ExitCode::FAILURE;
    }
    if let Some(stats) = &args.stats {
        match StatisticsSnapshot::load(stats) {
            Ok(snapshot) => {
                let restored = snapshot.apply(&mut tree);
                log::info!("Restored statistics of {restored} items from {stats:?}");
            }
            Err(err) => {
                log::error!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }
    log::info!("Index has {} nodes", tree.node_count());
    if let Some(usage) = memory_stats() {
        log::info!("Physical memory in use: {} bytes", usage.physical_mem);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("read error: {err}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Err(err) = run_command(&mut tree, line, args.limit, &mut stdout) {
            log::error!("write error: {err}");
            break;
        }
    }

    if let Some(stats) = &args.stats {
        if let Err(err) = StatisticsSnapshot::capture(&tree).save(stats) {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod test {
    use std::io::{self, Write};

    use kslib::{
        catalog::{index_catalog, parse_catalog},
        prefix_tree::PrefixTree,
    };

    use super::run_command;

    fn catalog_tree() -> PrefixTree<String> {
        let entries = parse_catalog("dog: puppy; doggo\ncat: kitty\n").unwrap();
        let mut tree = PrefixTree::new();
        index_catalog(&entries, &mut tree);
        tree
    }

    fn run(tree: &mut PrefixTree<String>, line: &str) -> String {
        let mut out = Vec::new();
        run_command(tree, line, 5, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn query_and_read_commands() {
        let mut tree = catalog_tree();
        assert_eq!(run(&mut tree, "? do"), " 1. dog (dog)\n");
        assert_eq!(run(&mut tree, "? zebra"), "");

        assert_eq!(run(&mut tree, "! cat | kitty"), "");
        assert_eq!(run(&mut tree, "? KIT"), " 1. cat (kitty)\n");
        assert_eq!(run(&mut tree, "! dog"), "");
        assert_eq!(run(&mut tree, "recent"), "dog\ncat\n");
        assert_eq!(run(&mut tree, "! wolf"), "error: unknown item \"wolf\"\n");
    }

    #[test]
    fn move_and_delete_commands() {
        let mut tree = catalog_tree();
        assert_eq!(run(&mut tree, "mv dog | doggo | hound"), "");
        assert_eq!(run(&mut tree, "? hou"), " 1. dog (hound)\n");
        assert_eq!(run(&mut tree, "mv dog | doggo | hound"), "error: nothing moved\n");
        assert_eq!(
            run(&mut tree, "mv dog hound"),
            "error: usage: mv <value> | <from> | <to>\n"
        );

        assert_eq!(run(&mut tree, "rm cat | kitty"), "");
        assert_eq!(run(&mut tree, "? kit"), "");
        assert_eq!(run(&mut tree, "rm cat | kitty"), "error: nothing deleted\n");
        assert_eq!(run(&mut tree, "rm cat"), "error: usage: rm <value> | <keyword>\n");
        assert_eq!(run(&mut tree, "ls"), "error: unknown command \"ls\"\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_writes_are_reported() {
        let mut tree = catalog_tree();
        let err = run_command(&mut tree, "? do", 5, &mut BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(run_command(&mut tree, "? zebra", 5, &mut BrokenPipe).is_ok());
    }
}
