//! kiln - build-lifecycle controller
//!
//! Entry point for the kiln command-line application.

fn main() {
    // Diagnostic tracing only; build output goes through the bound logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = kiln::cli::run(std::env::args().skip(1).collect());
    std::process::exit(code);
}
