use anyhow::Context;
use pascal_interpreter::config::{Config, LogFormat, Mode, USAGE};
use pascal_interpreter::{Lexer, Parser, execute, tokenize};
use tracing_subscriber::EnvFilter;

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(config.log_format);

    if config.mode == Mode::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let program = config.load_source().with_context(|| match &config.input {
        Some(path) => format!("reading {}", path.display()),
        None => "loading demo program".to_string(),
    })?;

    match config.mode {
        Mode::Tokens => {
            for token in tokenize(&program)? {
                println!("{token}");
            }
        }
        Mode::Ast => {
            let tree = Parser::new(Lexer::new(&program))?.parse()?;
            print!("{}", tree.outline());
        }
        Mode::Run | Mode::Help => {
            let variables = execute(&program)?;
            println!("Program executed successfully!");
            println!("Variables:");
            let mut vars: Vec<_> = variables.iter().collect();
            vars.sort_by_key(|(name, _)| *name);
            for (name, value) in vars {
                println!("  {} = {}", name, value);
            }
        }
    }

    Ok(())
}
