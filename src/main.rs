use owatch::cli::run;
use owatch::store::StoreError;

fn main() {
    let _ = enable_ansi_support::enable_ansi_support();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    if let Err(e) = run() {
        // Storage failures are internal errors; everything else is the user's input
        let internal = e.chain().any(|cause| cause.downcast_ref::<StoreError>().is_some());
        if internal {
            eprintln!("Internal error: {}", e);
            let mut causes = e.chain().skip(1).peekable();
            if causes.peek().is_some() {
                eprintln!("\nCaused by:");
                for (indent, cause) in causes.enumerate() {
                    eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
                }
            }
            std::process::exit(2);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
