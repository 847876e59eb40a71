mod debug_report;

use morphion::{
    ElementStore, EngineError, FunctionRegistry, NullDirective, Options, PatternRef, Registry,
    RuleVerdict, StemLog, StemSpan, Unit, UnitId, UnitType, link, order, segment_with,
};
use std::io::{self, IsTerminal, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut store = demo_lexicon();
    let word = config.input.trim().to_string();
    let token = store.insert(Unit::token("cli.input", word.as_str()));
    let stems = extract_stems(&store, token);

    let registry = Registry::with_defaults();
    let options = Options { max_nodes: config.budget };
    match segment_with(&registry, &mut store, &stems, token, UnitType::Morpheme, &options) {
        Ok(run) => debug_report::print_run(&store, &word, &run, config.color),
        Err(err @ (EngineError::NoSegmentation(_) | EngineError::MissingStems(_))) => {
            debug_report::print_miss(&word, &err, config.color)
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Demonstration lexicon: enough English morphology to show full covers,
/// null insertion, and link vetoes without shipping a dictionary.
fn demo_lexicon() -> ElementStore {
    let mut store = ElementStore::new();
    let functions = grammar_functions();

    for verb in ["walk", "talk", "break"] {
        store.insert(Unit::morpheme(verb, verb).with_class("VERB"));
    }
    for noun in ["cat", "cats", "dog"] {
        store.insert(Unit::morpheme(noun, noun).with_class("NOUN"));
    }
    store.insert(Unit::morpheme("s", "s").with_class("SUFFIX").with_link(link! {
        name: "plural attaches to a stem",
        check: |_token: &Unit, seq: &[&Unit]| -> bool {
            seq.iter().any(|u| u.has_class("NOUN") || u.has_class("VERB"))
        },
    }));
    let ed = store.insert(Unit::morpheme("ed", "ed").with_class("SUFFIX").with_class("TENSE"));
    store.insert(Unit::morpheme("ing", "ing").with_class("SUFFIX").with_class("TENSE"));
    store.insert(Unit::morpheme("able", "able").with_class("SUFFIX"));
    store.insert(Unit::morpheme("un", "un").with_class("PREFIX"));

    store.insert(Unit::null("tense.null").with_class("TENSE").with_link(link! {
        name: "tense needs a verb",
        check: |_token: &Unit, seq: &[&Unit]| -> bool {
            seq.iter().any(|u| u.has_class("VERB"))
        },
    }));

    store.add_ordering_rule(order! {
        name: "verbs carry tense",
        scope: ["VERB"],
        check: |seq: &[&Unit], nulls: &[&Unit]| -> RuleVerdict {
            if seq.iter().any(|u| u.has_class("TENSE")) {
                return RuleVerdict::pass();
            }
            if nulls.iter().any(|u| u.has_class("TENSE")) {
                RuleVerdict::pass_with(vec![NullDirective::before(
                    PatternRef::ByClass("TENSE".into()),
                    vec![PatternRef::ByClass("VERB".into())],
                )])
            } else {
                RuleVerdict::fail()
            }
        },
    });

    // The past suffix is decorated through the function registry, the same
    // path a full grammar pack would take.
    if let Ok(mark_past) = functions.get("mark_past") {
        if let Some(unit) = store.unit_mut(ed) {
            mark_past(unit);
        }
    }

    store
}

fn grammar_functions() -> FunctionRegistry {
    let mut functions = FunctionRegistry::new();
    functions.register("mark_past", &["gram:tense"], |unit| {
        unit.set_param("gram:tense", "past");
    });
    functions
}

/// Stand-in for the stem extraction stage: records the longest lexicon stem
/// occurring anywhere in the word. Real deployments feed the log from a
/// dedicated extractor.
fn extract_stems(store: &ElementStore, token: UnitId) -> StemLog {
    let mut stems = StemLog::new();
    let Some(word) = store.unit(token).map(|u| u.content.as_str()) else {
        return stems;
    };
    let chars: Vec<char> = word.chars().collect();

    let mut best: Option<(UnitId, usize, usize)> = None;
    for unit in store.units() {
        if unit.unit_type != UnitType::Morpheme || unit.null_variant {
            continue;
        }
        if !(unit.has_class("VERB") || unit.has_class("NOUN")) {
            continue;
        }
        let needle: Vec<char> = unit.content.chars().collect();
        if let Some(start) = find_chars(&chars, &needle) {
            if best.is_none_or(|(_, _, len)| needle.len() > len) {
                best = Some((unit.id(), start, needle.len()));
            }
        }
    }
    if let Some((unit, start, len)) = best {
        stems.record(token, StemSpan { unit, positions: (start..start + len).collect() });
    }
    stems
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

struct CliConfig {
    input: String,
    budget: usize,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut budget = Options::default().max_nodes;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("morphion {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--budget" => {
                let value =
                    args.next().ok_or_else(|| "error: --budget expects a value".to_string())?;
                budget = parse_budget(&value)?;
            }
            "--input" | "-i" => {
                let value =
                    args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--budget=") => {
                let value = arg.trim_start_matches("--budget=");
                budget = parse_budget(value)?;
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, budget, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_budget(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("error: invalid --budget '{value}' (expected a node count)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "morphion {version}

Morphological segmentation engine CLI. Segments a word against a built-in
demonstration lexicon and prints the run report.

Usage:
  morphion [OPTIONS] [--] <word...>
  morphion [OPTIONS] --input <word>

Options:
  -i, --input <word>   Word to segment. If omitted, reads remaining args
                       or stdin when no args are provided.
  --budget <count>     Decomposition node budget per run.
                       Default: {default_budget}
  --color              Force ANSI color output.
  --no-color           Disable ANSI color output.
  -h, --help           Show this help message.
  -V, --version        Print version information.

Exit codes:
  0  Success, including runs that register no outline.
  1  Internal error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_budget = Options::default().max_nodes
    )
}
