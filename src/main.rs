use clap::Parser;
use drd::cli::Cli;
use miette::{MietteHandlerOpts, Result};

fn main() -> Result<()> {
    // A closed stdout pipe ends the process instead of failing the write
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
    miette::set_hook(Box::new(|_| {
        Box::new(MietteHandlerOpts::new().unicode(true).context_lines(1).build())
    }))?;

    let cli = Cli::parse();
    drd::cli::init_tracing(cli.global.verbose);

    drd::cli::commands::generate::run(cli.generate, &cli.global)
}
