fn main() {
    use clap::Parser;
    let args = armoread::cli::reader::ReaderArgs::parse();
    armoread::logging::init_logging(args.common.verbose);
    if let Err(e) = armoread::cli::reader::run(&args) {
        armoread::cli::report_error(&e, args.common.verbose);
        std::process::exit(e.exit_code());
    }
}
