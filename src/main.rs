use std::{env, fs, path::PathBuf, process::ExitCode};

use cee::{
    lexer::Lexer,
    pre,
    token::{Token, TokenKind},
};

struct Options {
    input: PathBuf,
    dump_tokens: bool,
    write_output: bool,
}

fn usage(program: &str) -> ExitCode {
    eprintln!("usage: {program} [--tokens] [--no-output] <file.c>");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    if env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "cee".into());
    let mut input = None;
    let mut dump_tokens = false;
    let mut write_output = true;
    for arg in args {
        match arg.as_str() {
            "--tokens" => dump_tokens = true,
            "--no-output" => write_output = false,
            _ if arg.starts_with('-') => return usage(&program),
            _ if input.is_some() => return usage(&program),
            _ => input = Some(PathBuf::from(arg)),
        }
    }
    let Some(input) = input else {
        return usage(&program);
    };

    run(&Options { input, dump_tokens, write_output })
}

fn run(opts: &Options) -> ExitCode {
    let raw = match fs::read(&opts.input) {
        Ok(raw) => raw,
        Err(error) => {
            eprintln!("{}: {error}", opts.input.display());
            return ExitCode::FAILURE;
        }
    };

    let normalized = match pre::normalize(raw) {
        Ok(buf) => buf,
        Err(error) => {
            eprintln!("{}: {error}", opts.input.display());
            return ExitCode::FAILURE;
        }
    };

    if opts.write_output {
        let output = opts.input.with_extension("i");
        if let Err(error) = fs::write(&output, &normalized) {
            eprintln!("{}: {error}", output.display());
            return ExitCode::FAILURE;
        }
    }

    let mut lexer = Lexer::new(normalized);
    loop {
        lexer.advance();
        if opts.dump_tokens {
            print!("{}\t", lexer.line());
            print_token(lexer.token(), &lexer);
        }
        if lexer.token().is_eof() {
            break;
        }
    }
    for diag in lexer.diagnostics() {
        eprintln!("{}: {diag}", opts.input.display());
    }
    if lexer.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_token(token: &Token, lexer: &Lexer) {
    use cee::token::StringPayload;
    match &token.kind {
        TokenKind::None => println!("x:<NONE>"),
        TokenKind::Eof => println!("x:<END>"),
        TokenKind::Keyword(kw) => println!("k:{kw}"),
        TokenKind::Identifier(sym) => println!("i:{}", lexer.idents().get(*sym)),
        TokenKind::Integer { value, affix } => println!("ic:{value}{affix}"),
        TokenKind::Floating { value, affix } => println!("fc:{value}{affix}"),
        TokenKind::Character { value, wide } => {
            let prefix = if *wide { "L" } else { "" };
            println!("cc:{prefix}U+{value:04X}");
        }
        TokenKind::String(StringPayload::Narrow(bytes)) => {
            println!("s:{}", String::from_utf8_lossy(bytes));
        }
        TokenKind::String(StringPayload::Wide(cps)) => {
            let text: String = cps
                .iter()
                .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            println!("s:L{text}");
        }
        TokenKind::Punct(p) => println!("p:{p}"),
    }
}
