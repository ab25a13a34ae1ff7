use ig_browser::Browser;
use ig_core::BrowserResult;
use ig_net::NetConfig;
use ig_net::Transport;
use std::process::ExitCode;

const DEFAULT_URL: &str = "https://example.org/index.html";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let raw = match uri_from_args(std::env::args().skip(1)) {
        Ok(raw) => raw,
        Err(error) => {
            eprintln!("Ignis startup error: {error}");
            return ExitCode::from(2);
        }
    };

    match run(&raw) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("Ignis could not load {raw}: {error}");
            ExitCode::FAILURE
        }
    }
}

fn uri_from_args(mut args: impl Iterator<Item = String>) -> Result<String, String> {
    let raw = args.next().unwrap_or_else(|| DEFAULT_URL.to_owned());
    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument `{extra}` (usage: ignis [URI])"));
    }
    Ok(raw)
}

fn run(raw: &str) -> BrowserResult<String> {
    let mut browser = Browser::new(&NetConfig::default())?;
    let mut transport = browser.open(raw)?;
    transport.set_header("Accept-Encoding", "gzip")?;
    log::info!("loading {raw} over {}", transport.protocol());

    Ok(browser.load(transport)?.into_string())
}
