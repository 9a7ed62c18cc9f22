use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dwalk_core::{Value, VisitKind, WalkOpts};
use serde_json::Number;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dwalk",
    about = "Walk JSON documents and rewrite strings, keys and numbers in place",
    version
)]
struct Cli {
    /// Log walk internals to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print every visit as kind, path and value
    Visits(VisitsArgs),
    /// Replace every string or piece equal to --from with --to
    Replace(ReplaceArgs),
    /// Upper- or lower-case every string, key and piece
    Case(CaseArgs),
    /// Add to every number inside a container, optionally clamped
    Bump(BumpArgs),
}

#[derive(ClapArgs, Debug)]
struct WalkArgs {
    /// JSON file with walk options, e.g. {"split-on": " ", "kinds": ["mapping-value-string"]}
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,
    /// Also visit pieces of strings split on this separator
    #[arg(long)]
    split_on: Option<String>,
    /// Keep the separator at the start of every piece but the first
    #[arg(long, default_value_t = false)]
    include_separator: bool,
    /// Max number of ancestors tracked per node
    #[arg(long)]
    max_path_length: Option<usize>,
    /// Do not split mapping keys
    #[arg(long, default_value_t = false)]
    no_split_keys: bool,
    /// Only deliver these visit kinds (comma separated, e.g. mapping-value-string,number)
    #[arg(long, value_delimiter = ',')]
    kinds: Vec<VisitKind>,
}

#[derive(ClapArgs, Debug)]
struct VisitsArgs {
    /// JSON file to walk
    path: PathBuf,
    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(ClapArgs, Debug)]
struct ReplaceArgs {
    /// JSON file to walk
    path: PathBuf,
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CaseMode {
    Upper,
    Lower,
}

#[derive(ClapArgs, Debug)]
struct CaseArgs {
    /// JSON file to walk
    path: PathBuf,
    #[arg(long, value_enum)]
    mode: CaseMode,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    walk: WalkArgs,
}

#[derive(ClapArgs, Debug)]
struct BumpArgs {
    /// JSON file to walk
    path: PathBuf,
    /// Amount added to every number
    #[arg(long, allow_negative_numbers = true)]
    by: f64,
    /// Lower bound for the result
    #[arg(long, allow_negative_numbers = true)]
    min: Option<f64>,
    /// Upper bound for the result
    #[arg(long, allow_negative_numbers = true)]
    max: Option<f64>,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    walk: WalkArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Visits(a) => cmd_visits(a, cli.verbose),
        Cmd::Replace(a) => cmd_replace(a, cli.verbose),
        Cmd::Case(a) => cmd_case(a, cli.verbose),
        Cmd::Bump(a) => cmd_bump(a, cli.verbose),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// Config file first, then command-line flags on top.
fn walk_opts(args: &WalkArgs, verbose: bool) -> WalkOpts {
    let mut opts = match &args.config {
        Some(p) => {
            let text = std::fs::read_to_string(p).unwrap_or_else(|e| {
                eprintln!("error reading config {}: {}", p.display(), e);
                std::process::exit(3);
            });
            serde_json::from_str::<WalkOpts>(&text).unwrap_or_else(|e| {
                eprintln!("invalid config {}: {}", p.display(), e);
                std::process::exit(3);
            })
        }
        None => WalkOpts::default(),
    };
    if let Some(sep) = &args.split_on {
        opts.split_on = Some(sep.clone());
    }
    if args.include_separator {
        opts.include_separator = true;
    }
    if let Some(max) = args.max_path_length {
        opts.max_path_length = Some(max);
    }
    if args.no_split_keys {
        opts.split_keys = Some(false);
    }
    if !args.kinds.is_empty() {
        opts.kinds = Some(args.kinds.iter().copied().collect());
    }
    opts.debug |= verbose;
    opts
}

fn load(path: &Path) -> Value {
    dwalk_core::parse_file_to_value(path).unwrap_or_else(|e| {
        eprintln!("error: {}: {}", path.display(), e);
        std::process::exit(2);
    })
}

fn run_walk<F>(root: &Value, opts: &WalkOpts, callback: F)
where
    F: FnMut(&mut dwalk_core::Visit<'_>) -> Result<(), dwalk_core::WalkError>,
{
    dwalk_core::walk(root, opts, callback).unwrap_or_else(|e| {
        eprintln!("walk failed: {}", e);
        std::process::exit(4);
    });
}

fn emit_result(root: &Value, out: Option<PathBuf>) {
    if let Some(out) = out {
        dwalk_core::write_value_to_file(&out, root).unwrap_or_else(|e| {
            eprintln!("error writing: {}", e);
            std::process::exit(5);
        });
    } else {
        match serde_json::to_string_pretty(&root.to_json()) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error writing: {}", e);
                std::process::exit(5);
            }
        }
    }
}

fn edits_text(kind: VisitKind) -> bool {
    kind.is_string() || kind.is_substring()
}

fn cmd_visits(args: VisitsArgs, verbose: bool) {
    let root = load(&args.path);
    let opts = walk_opts(&args.walk, verbose);
    run_walk(&root, &opts, |visit| {
        println!(
            "{}\t{}\t{}",
            visit.kind(),
            dwalk_core::display_path(visit.path()),
            visit.value().to_json()
        );
        Ok(())
    });
}

fn cmd_replace(args: ReplaceArgs, verbose: bool) {
    let root = load(&args.path);
    let opts = walk_opts(&args.walk, verbose);
    let mut replaced = 0usize;
    run_walk(&root, &opts, |visit| {
        if edits_text(visit.kind()) && visit.text() == Some(args.from.as_str()) {
            visit.commit(args.to.as_str())?;
            replaced += 1;
        }
        Ok(())
    });
    debug!(replaced, "replace finished");
    emit_result(&root, args.out);
}

fn cmd_case(args: CaseArgs, verbose: bool) {
    let root = load(&args.path);
    let opts = walk_opts(&args.walk, verbose);
    run_walk(&root, &opts, |visit| {
        if !edits_text(visit.kind()) {
            return Ok(());
        }
        let Some(text) = visit.text() else {
            return Ok(());
        };
        let converted = match args.mode {
            CaseMode::Upper => text.to_uppercase(),
            CaseMode::Lower => text.to_lowercase(),
        };
        if converted != text {
            visit.commit(converted)?;
        }
        Ok(())
    });
    emit_result(&root, args.out);
}

fn cmd_bump(args: BumpArgs, verbose: bool) {
    let root = load(&args.path);
    let opts = walk_opts(&args.walk, verbose);
    run_walk(&root, &opts, |visit| {
        // Root numbers have no slot to write into.
        if !visit.is_modifiable() {
            return Ok(());
        }
        if let Some(n) = visit.number().cloned() {
            visit.commit(bump_number(&n, args.by, args.min, args.max))?;
        }
        Ok(())
    });
    emit_result(&root, args.out);
}

// Integral results stay integers so `94 + 10` prints as `100`, not `100.0`.
fn bump_number(n: &Number, by: f64, min: Option<f64>, max: Option<f64>) -> Value {
    let mut x = n.as_f64().unwrap_or(0.0) + by;
    if let Some(hi) = max {
        x = x.min(hi);
    }
    if let Some(lo) = min {
        x = x.max(lo);
    }
    if x.fract() == 0.0 && x.abs() < 9_007_199_254_740_992.0 {
        Value::from(x as i64)
    } else {
        Value::float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_keeps_integers_and_clamps() {
        assert_eq!(bump_number(&94.into(), 10.0, None, Some(100.0)), Value::from(100));
        assert_eq!(bump_number(&72.into(), 10.0, None, Some(100.0)), Value::from(82));
        assert_eq!(bump_number(&1.into(), 0.5, None, None), Value::from(1.5));
        assert_eq!(bump_number(&1.into(), -5.0, Some(0.0), None), Value::from(0));
    }

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::parse_from([
            "dwalk",
            "visits",
            "data.json",
            "--split-on",
            " ",
            "--no-split-keys",
            "--kinds",
            "mapping-key-string,number",
        ]);
        let Cmd::Visits(args) = cli.cmd else {
            panic!("expected visits");
        };
        let opts = walk_opts(&args.walk, true);
        assert_eq!(opts.split_on.as_deref(), Some(" "));
        assert!(!opts.splits_keys());
        assert!(opts.allows(VisitKind::Number));
        assert!(!opts.allows(VisitKind::ContainerMapping));
        assert!(opts.debug);
    }
}
