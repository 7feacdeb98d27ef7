extern crate memocal as lib;

use flexi_logger::{FileSpec, Logger};
use lib::calendar::MonthIndex;
use lib::events::Dispatcher;
use lib::memo::{FileStore, KvStore, MemoStore, MemoryStore};
use lib::selection::SelectionController;
use lib::ui::app::App;
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "mcal",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "Memocal - A month calendar with one memo per day."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only show calendar non-interactively"
    )]
    pub show: bool,

    #[structopt(long = "ephemeral", help = "keep memos in memory only")]
    pub ephemeral: bool,

    #[structopt(long = "month", help = "month to show first, as YYYY-MM")]
    pub month: Option<MonthIndex>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    std::panic::set_hook(Box::new(move |info| {
        println!("Memocal ran into a fatal error!");
        println!(
            "Consider filing an issue with a log file and the backtrace below at {}",
            env!("CARGO_PKG_REPOSITORY")
        );

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let backend: Box<dyn KvStore> = if args.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        log::info!("Storing memos in '{}'", config.data_dir.display());
        Box::new(FileStore::new(&config.data_dir))
    };

    let controller =
        SelectionController::new(MemoStore::new(backend), args.month.unwrap_or_default())
            .with_policy(config.navigation);

    let mut app = App::new(&config, controller);

    let stdout = stdout();
    if args.show {
        app.draw(&mut stdout.lock())?;
        return Ok(());
    }

    app.run(Dispatcher::default(), stdout.lock())?;
    Ok(())
}
