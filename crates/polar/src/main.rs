use std::process::ExitCode;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use polar_errors::Diagnostic;
use polar_parse::ParseOptions;
use polar_tokenizer::{Lexer, LexerMode, LexerOptions, LiteralValue, SyntaxKind};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(about = "Inspect how PHP source is lexed and parsed")]
enum Options {
    /// Print every token with its range and literal value.
    Tokens {
        #[command(flatten)]
        input: Input,
        /// Accept `<?` as an open tag.
        #[arg(long)]
        short_open_tag: bool,
    },
    /// Print the syntax tree.
    Tree {
        #[command(flatten)]
        input: Input,
    },
    /// Report diagnostics only.
    Check {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    path: Utf8PathBuf,
    /// Start in inline HTML, as a `.php` file does.
    #[arg(long)]
    file_mode: bool,
}

impl Input {
    fn read(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.path).with_context(|| format!("failed to read `{}`", self.path))
    }

    fn lexer_options(&self) -> LexerOptions {
        if self.file_mode { LexerOptions::file() } else { LexerOptions::default() }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let (path, diagnostics) = match Options::parse() {
        Options::Tokens { input, short_open_tag } => {
            let text = input.read()?;
            let options = LexerOptions { short_open_tag, ..input.lexer_options() };
            (input.path, dump_tokens(&text, options))
        }
        Options::Tree { input } => {
            let text = input.read()?;
            let parse = polar_parse::parse(&text, ParseOptions { lexer: input.lexer_options() });
            print!("{}", parse.debug_tree());
            (input.path, parse.diagnostics().to_vec())
        }
        Options::Check { input } => {
            let text = input.read()?;
            let parse = polar_parse::parse(&text, ParseOptions { lexer: input.lexer_options() });
            (input.path, parse.diagnostics().to_vec())
        }
    };

    report(&path, &diagnostics);
    Ok(if diagnostics.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn dump_tokens(text: &str, options: LexerOptions) -> Vec<Diagnostic> {
    tracing::debug!(initial = matches!(options.mode, LexerMode::Initial), "lexing");

    let mut lexer = Lexer::new(text, options);
    loop {
        let token = lexer.next_token();
        let mut line = format!("{:?}@{:?} {:?}", token.kind(), token.range(), token.text());
        match token.value() {
            Some(LiteralValue::Integer(value)) => line += &format!(" = {value}"),
            Some(LiteralValue::Double(value)) => line += &format!(" = {value:?}"),
            Some(LiteralValue::String(bytes)) => {
                line += &format!(" = {:?}", String::from_utf8_lossy(bytes));
            }
            None => {}
        }
        if !token.flags().is_empty() {
            line += &format!(" {:?}", token.flags());
        }
        println!("{line}");

        if token.kind() == SyntaxKind::EOF {
            break;
        }
    }
    lexer.into_diagnostics()
}

fn report(path: &Utf8Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{path}: {diagnostic}");
    }
}
