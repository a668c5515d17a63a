//! symreg CLI: multi-objective symbolic regression on a CSV file.
//!
//! Usage:
//!   symreg --data=<file.csv> [--target=y] [options]
//!
//! Options:
//!   --target=<column>         Target column name (default: y)
//!   --seed=<N>                Random seed (default: 42)
//!   --population=<N>          Population size (default: 1000)
//!   --generations=<N>         Number of generations (default: 10)
//!   --functions=add,sub,...   Function set (default: add,sub,mul,div,sin,cos)
//!   --init-depth=2,6          Initial tree depth range
//!   --init-method=<method>    full | grow | half-and-half
//!   --const-range=-1,1        Ephemeral constant bounds; `none` disables
//!   --metric=<mse|mae>        Error metric (default: mse)
//!   --tournament=<N>          Tournament size (default: 2)
//!   --output=<file.json>      Write the final Pareto front as JSON
//!
//! Unknown flags are rejected. Set `RUST_LOG=info` to see the
//! per-generation report.

use serde::Serialize;
use u_symreg::data::Dataset;
use u_symreg::gp::{Champion, InitMethod, Metric, SrConfig, SrRunner};

/// CLI configuration parsed from command-line arguments.
struct CliConfig {
    data: String,
    target: String,
    output: Option<String>,
    run: SrConfig,
}

/// JSON report written by `--output`.
#[derive(Serialize)]
struct FrontReport<'a> {
    seed: u64,
    generations: usize,
    evaluations: usize,
    target: &'a str,
    config: &'a SrConfig,
    pareto_front: Vec<Champion>,
}

/// Flags `parse_args` understands; anything else starting with `--` is an error.
const KNOWN_FLAGS: &[&str] = &[
    "data",
    "target",
    "seed",
    "population",
    "generations",
    "functions",
    "init-depth",
    "init-method",
    "const-range",
    "metric",
    "tournament",
    "output",
];

fn check_flags(args: &[String]) -> Result<(), String> {
    for arg in args {
        let name = match arg.strip_prefix("--") {
            Some(rest) => rest.split_once('=').map_or(rest, |(name, _)| name),
            None => return Err(format!("unexpected argument `{arg}`")),
        };
        if !KNOWN_FLAGS.contains(&name) {
            return Err(format!("unknown flag `--{name}`"));
        }
        if !arg.contains('=') {
            return Err(format!("--{name} expects a value: --{name}=<value>"));
        }
    }
    Ok(())
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("--{name}=");
    args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
}

fn parse_value<T: std::str::FromStr>(args: &[String], name: &str) -> Result<Option<T>, String> {
    match flag(args, name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("invalid value for --{name}: `{raw}`")),
        None => Ok(None),
    }
}

fn parse_pair<T: std::str::FromStr>(name: &str, raw: &str) -> Result<(T, T), String> {
    let err = || format!("--{name} expects two comma-separated values, got `{raw}`");
    let (lo, hi) = raw.split_once(',').ok_or_else(err)?;
    let lo = lo.trim().parse::<T>().map_err(|_| err())?;
    let hi = hi.trim().parse::<T>().map_err(|_| err())?;
    Ok((lo, hi))
}

fn parse_args() -> Result<CliConfig, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    check_flags(&args)?;

    let data = flag(&args, "data")
        .ok_or("missing --data=<file.csv>")?
        .to_string();
    let target = flag(&args, "target").unwrap_or("y").to_string();
    let output = flag(&args, "output").map(str::to_string);

    let mut run = SrConfig::default().with_seed(parse_value(&args, "seed")?.unwrap_or(42));
    if let Some(n) = parse_value(&args, "population")? {
        run = run.with_population_size(n);
    }
    if let Some(n) = parse_value(&args, "generations")? {
        run = run.with_max_generations(n);
    }
    if let Some(list) = flag(&args, "functions") {
        let names: Vec<&str> = list.split(',').map(str::trim).collect();
        run = run.with_functions(&names);
    }
    if let Some(raw) = flag(&args, "init-depth") {
        let (lo, hi) = parse_pair::<usize>("init-depth", raw)?;
        run = run.with_init_depth(lo, hi);
    }
    if let Some(method) = parse_value::<String>(&args, "init-method")? {
        run = run.with_init_method(method.parse::<InitMethod>()?);
    }
    if let Some(raw) = flag(&args, "const-range") {
        let range = if raw.trim().eq_ignore_ascii_case("none") {
            None
        } else {
            Some(parse_pair::<f64>("const-range", raw)?)
        };
        run = run.with_const_range(range);
    }
    if let Some(metric) = parse_value::<String>(&args, "metric")? {
        run = run.with_metric(metric.parse::<Metric>()?);
    }
    if let Some(k) = parse_value(&args, "tournament")? {
        run = run.with_tournament_size(k);
    }

    Ok(CliConfig {
        data,
        target,
        output,
        run,
    })
}

fn save_json<T: Serialize>(path: &str, data: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("failed to serialize {path}: {e}"))?;
    std::fs::write(path, json).map_err(|e| format!("failed to write {path}: {e}"))
}

fn main() {
    env_logger::init();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    };

    let dataset = match Dataset::from_csv_path(&cli.data, &cli.target) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = match SrRunner::run(&dataset, &cli.run) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Pareto front after {} generations ({} evaluations, seed {}):",
        result.generations, result.evaluations, result.seed
    );
    println!("  {:>10} | {:>14} | expression", "complexity", "error");
    let front = result.front_champions();
    for champion in &front {
        println!(
            "  {:>10} | {:>14.6} | {}",
            champion.complexity, champion.error, champion.expression
        );
    }

    if let Some(path) = &cli.output {
        let report = FrontReport {
            seed: result.seed,
            generations: result.generations,
            evaluations: result.evaluations,
            target: &cli.target,
            config: &cli.run,
            pareto_front: front,
        };
        if let Err(msg) = save_json(path, &report) {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
        println!("Pareto front saved: {}", path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_known_flags_accepted() {
        let ok = args(&["--data=d.csv", "--population=50", "--const-range=none"]);
        assert!(check_flags(&ok).is_ok());
        assert!(check_flags(&[]).is_ok());
    }

    #[test]
    fn test_misspelled_flag_rejected() {
        let err = check_flags(&args(&["--data=d.csv", "--populaton=50"])).unwrap_err();
        assert!(err.contains("--populaton"), "{err}");
    }

    #[test]
    fn test_flag_without_value_or_stray_argument_rejected() {
        assert!(check_flags(&args(&["--seed"])).is_err());
        assert!(check_flags(&args(&["data.csv"])).is_err());
    }

    #[test]
    fn test_save_json_reports_write_failure() {
        let dir = std::env::temp_dir().join("symreg-missing-dir-for-save-json");
        let path = dir.join("front.json");
        let err = save_json(path.to_str().unwrap(), &vec![1, 2, 3]).unwrap_err();
        assert!(err.starts_with("failed to write"), "{err}");
    }

    #[test]
    fn test_save_json_writes_file() {
        let path = std::env::temp_dir().join("symreg-save-json-test.json");
        let path = path.to_str().unwrap();
        save_json(path, &vec![1, 2, 3]).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains('2'));
        let _ = std::fs::remove_file(path);
    }
}
