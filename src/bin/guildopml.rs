fn main() {
    use clap::Parser;
    let args = armoread::cli::opml::OpmlArgs::parse();
    armoread::logging::init_logging(args.common.verbose);
    if let Err(e) = armoread::cli::opml::run(&args) {
        armoread::cli::report_error(&e, args.common.verbose);
        std::process::exit(e.exit_code());
    }
}
