mod report;

use std::io::{self, IsTerminal, Read};

use chemsift::classify;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let text = match read_document(&config.input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if config.json {
        let json = chemsift::extract_to_json(&text);
        match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{pretty}"),
            Err(err) => {
                eprintln!("error: failed to serialize profile: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    let (waste, corrections) = classify(&text);
    report::print_profile(&waste, &corrections, config.color);

    if let Some(other_path) = &config.check {
        let other_text = match read_document(&Input::File(other_path.clone())) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        };
        let (other, _) = classify(&other_text);
        let verdict = chemsift::check(&waste, &other);
        report::print_verdict(&waste, &other, &verdict, config.color);
        if !verdict.compatible {
            std::process::exit(3);
        }
    }
}

enum Input {
    Inline(String),
    File(String),
    Stdin,
}

struct CliConfig {
    input: Input,
    check: Option<String>,
    json: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<Input> = None;
    let mut check: Option<String> = None;
    let mut json = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("chemsift {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--json" => json = true,
            "--color" => color = true,
            "--no-color" => color = false,
            "--check" => {
                let value = args.next().ok_or_else(|| "error: --check expects a file".to_string())?;
                check = Some(value);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(Input::Inline(value));
            }
            _ if arg.starts_with("--check=") => {
                check = Some(arg.trim_start_matches("--check=").to_string());
            }
            _ if arg.starts_with("--input=") => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(Input::Inline(arg.trim_start_matches("--input=").to_string()));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(Input::File(arg));
            }
        }
    }

    Ok(CliConfig { input: input.unwrap_or(Input::Stdin), check, json, color })
}

fn read_document(input: &Input) -> Result<String, String> {
    let text = match input {
        Input::Inline(text) => text.clone(),
        Input::File(path) => {
            std::fs::read_to_string(path).map_err(|err| format!("error: failed to read '{path}': {err}"))?
        }
        Input::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
            buffer
        }
    };
    if text.trim().is_empty() {
        return Err(format!("error: no document text provided\n\n{}", help_text()));
    }
    Ok(text)
}

fn help_text() -> String {
    format!(
        "chemsift {version}

Safety-document extraction and material compatibility CLI.

Usage:
  chemsift [OPTIONS] [FILE]
  chemsift [OPTIONS] --input <text>

Reads document text from FILE, --input, or stdin.

Options:
  -i, --input <text>    Document text given inline instead of a file.
  --json                Print the extracted profile as JSON and exit.
  --check <file>        Classify a second document and report whether the
                        two materials may share a container.
  --color               Force ANSI color output.
  --no-color            Disable ANSI color output.
  -h, --help            Show this help message.
  -V, --version         Print version information.

Exit codes:
  0  Success (and, with --check, the pair is compatible).
  1  Internal or I/O error.
  2  Invalid arguments or missing input.
  3  The checked pair is incompatible.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
